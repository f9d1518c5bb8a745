//! Dynamic value model
//!
//! `Value` is the uniform currency of accessors: receivers, arguments and
//! results are all passed as values. Primitives are stored inline. Objects are
//! shared references; an object whose type is a struct is a *box* and gets
//! copied whenever it crosses an accessor boundary (see [`Value::detach`]).
//! Boxes compare by contents, class instances by identity.

use std::fmt;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::handle::TypeHandle;
use crate::object::{Object, ObjectRef};
use crate::types::{PrimitiveKind, TypeDef, TypeKind};

/// A dynamically typed value
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit float
    Float64(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Class instance or boxed struct
    Object(ObjectRef),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Zero value for a type: primitive zero, a fresh zeroed struct, or null
    pub fn zero_of(type_def: &Arc<TypeDef>) -> Value {
        match type_def.kind() {
            TypeKind::Primitive(PrimitiveKind::Bool) => Value::Bool(false),
            TypeKind::Primitive(PrimitiveKind::Int32) => Value::Int32(0),
            TypeKind::Primitive(PrimitiveKind::Int64) => Value::Int64(0),
            TypeKind::Primitive(PrimitiveKind::Float64) => Value::Float64(0.0),
            TypeKind::Struct => Value::Object(Object::zeroed(type_def)),
            TypeKind::Void | TypeKind::Class | TypeKind::Interface => Value::Null,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value, `None` for null
    pub fn type_handle(&self) -> Option<TypeHandle> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeHandle::BOOL),
            Value::Int32(_) => Some(TypeHandle::INT32),
            Value::Int64(_) => Some(TypeHandle::INT64),
            Value::Float64(_) => Some(TypeHandle::FLOAT64),
            Value::Str(_) => Some(TypeHandle::STRING),
            Value::Object(obj) => Some(obj.type_handle()),
        }
    }

    /// Display name of the runtime type
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Object(obj) => obj.type_def().name().to_string(),
            other => other
                .type_handle()
                .and_then(TypeHandle::builtin_name)
                .unwrap_or("?")
                .to_string(),
        }
    }

    /// Whether the value is a non-null instance of `target`
    pub fn is_instance_of(&self, target: TypeHandle) -> bool {
        match self {
            Value::Null => false,
            Value::Object(obj) => obj.type_def().is_subtype_of(target),
            primitive => target == TypeHandle::OBJECT || primitive.type_handle() == Some(target),
        }
    }

    /// Whether the value is a boxed struct
    pub fn is_boxed_struct(&self) -> bool {
        matches!(self, Value::Object(obj) if obj.type_def().is_value_type())
    }

    /// Copy boxed structs so the result shares no state with `self`
    ///
    /// Class instances and primitives are returned as-is.
    pub fn detach(&self) -> Value {
        match self {
            Value::Object(obj) if obj.type_def().is_value_type() => {
                Value::Object(Arc::new(obj.duplicate()))
            }
            other => other.clone(),
        }
    }

    /// Whether both values refer to the same object
    pub fn same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// Get as object reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.type_def().is_value_type()
                        && a.type_handle() == b.type_handle()
                        && a.snapshot() == b.snapshot())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}i32", i),
            Value::Int64(i) => write!(f, "{}i64", i),
            Value::Float64(x) => write!(f, "{}f64", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float64(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a dynamic value into a concrete Rust type
pub trait FromValue: Sized {
    /// Convert, failing with `InvalidCast` when the value has the wrong shape
    fn from_value(value: Value) -> Result<Self, RuntimeError>;
}

fn cast_failure(value: &Value, to: &str) -> RuntimeError {
    RuntimeError::InvalidCast {
        from: value.type_name(),
        to: to.to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        value.as_bool().ok_or_else(|| cast_failure(&value, "Bool"))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        value.as_i32().ok_or_else(|| cast_failure(&value, "Int32"))
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        value.as_i64().ok_or_else(|| cast_failure(&value, "Int64"))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        value.as_f64().ok_or_else(|| cast_failure(&value, "Float64"))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(cast_failure(&other, "String")),
        }
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(RuntimeError::NullReference),
            other => Err(cast_failure(&other, "Object")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
