//! Coercion rules applied by compiled accessors
//!
//! Values crossing into a member (setter inputs, arguments) go through
//! [`cast_value`]; receivers go through [`cast_reference`]; values coming out
//! of a member go through [`box_value`]. No numeric widening or narrowing is
//! ever performed.

use rapid_meta::{RuntimeError, TypeDef, Value};

fn invalid_cast(value: &Value, target: &TypeDef) -> RuntimeError {
    RuntimeError::InvalidCast {
        from: value.type_name(),
        to: target.name().to_string(),
    }
}

/// Coerce a value to a member's declared type
///
/// Null passes only into types that accept it. Value types require an exact
/// match and are copied; reference types pass through by reference.
pub fn cast_value(value: &Value, target: &TypeDef) -> Result<Value, RuntimeError> {
    match value {
        Value::Null if target.accepts_null() => Ok(Value::Null),
        v if v.is_instance_of(target.handle()) => {
            if target.is_value_type() {
                Ok(v.detach())
            } else {
                Ok(v.clone())
            }
        }
        v => Err(invalid_cast(v, target)),
    }
}

/// Check a receiver against the declaring type
///
/// The receiver is never copied: a boxed struct receiver is the box the
/// member operates on. A null receiver passes for reference types and is
/// left for the member access to fault on.
pub fn cast_reference(value: &Value, target: &TypeDef) -> Result<Value, RuntimeError> {
    match value {
        Value::Null if target.is_value_type() => Err(RuntimeError::NullReference),
        Value::Null => Ok(Value::Null),
        v if v.is_instance_of(target.handle()) => Ok(v.clone()),
        v => Err(invalid_cast(v, target)),
    }
}

/// Wrap a value produced by a member into the opaque form
///
/// Boxed structs are copied so the caller never aliases member storage.
pub fn box_value(value: &Value) -> Value {
    value.detach()
}
