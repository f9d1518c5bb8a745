//! Strongly-typed accessor views
//!
//! A typed accessor is compiled for a fixed `(owner, value)` pair of types.
//! The pair is checked against the member once, on the cache miss that
//! compiles the accessor; incompatible pairs never produce an accessor.

use rapid_meta::{FromValue, TypeHandle, TypeRegistry, Value};

use crate::accessor::{Getter, Setter};
use crate::error::{AccessorError, AccessorResult};

/// The `(owner, value)` types a typed accessor is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypedView {
    /// Static type of the receiver
    pub owner: TypeHandle,
    /// Static type of the member value
    pub value: TypeHandle,
}

impl TypedView {
    /// Create a view
    pub fn new(owner: TypeHandle, value: TypeHandle) -> Self {
        Self { owner, value }
    }
}

/// Direction of a typed access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// What the view is checked against
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemberShape {
    pub declaring_type: TypeHandle,
    pub member_type: TypeHandle,
    pub is_static: bool,
}

fn type_name(registry: &TypeRegistry, handle: TypeHandle) -> String {
    registry
        .get(handle)
        .map_or_else(|| handle.to_string(), |t| t.name().to_string())
}

/// Check a view against a member for one access direction
pub(crate) fn check_view(
    registry: &TypeRegistry,
    member: MemberShape,
    view: TypedView,
    access: Access,
    param: &'static str,
) -> AccessorResult<()> {
    for handle in [view.owner, view.value] {
        if !registry.contains(handle) {
            return Err(AccessorError::shape(format!("Unknown type '{}'.", handle), param));
        }
    }

    if view.owner != TypeHandle::OBJECT
        && !registry.is_assignable_from(member.declaring_type, view.owner)
    {
        return Err(AccessorError::shape(
            format!(
                "The owner type '{}' is not compatible with the declaring type '{}'.",
                type_name(registry, view.owner),
                type_name(registry, member.declaring_type)
            ),
            param,
        ));
    }

    match access {
        Access::Read => {
            if !registry.is_assignable_from(view.value, member.member_type) {
                return Err(AccessorError::shape(
                    format!(
                        "The value type '{}' is not assignable from the member type '{}'.",
                        type_name(registry, view.value),
                        type_name(registry, member.member_type)
                    ),
                    param,
                ));
            }
        }
        Access::Write => {
            let owner_is_value_type = registry.get(view.owner).is_some_and(|t| t.is_value_type());
            if !member.is_static && owner_is_value_type {
                return Err(AccessorError::shape(
                    format!(
                        "An instance member cannot be written through the value-type owner '{}'.",
                        type_name(registry, view.owner)
                    ),
                    param,
                ));
            }
            // A wider value type is narrowed per call by the member coercion
            let related = registry.is_assignable_from(member.member_type, view.value)
                || registry.is_assignable_from(view.value, member.member_type);
            if !related {
                return Err(AccessorError::shape(
                    format!(
                        "The value type '{}' is not compatible with the member type '{}'.",
                        type_name(registry, view.value),
                        type_name(registry, member.member_type)
                    ),
                    param,
                ));
            }
        }
    }
    Ok(())
}

/// Reads a member through a fixed typed view
#[derive(Debug, Clone)]
pub struct TypedGetter {
    getter: Getter,
    view: TypedView,
}

impl TypedGetter {
    pub(crate) fn new(getter: Getter, view: TypedView) -> Self {
        Self { getter, view }
    }

    /// The view this accessor was compiled for
    pub fn view(&self) -> TypedView {
        self.view
    }

    /// Read the member
    pub fn get(&self, receiver: &Value) -> AccessorResult<Value> {
        self.getter.get(receiver)
    }

    /// Read the member and convert it at the Rust boundary
    pub fn get_as<T: FromValue>(&self, receiver: &Value) -> AccessorResult<T> {
        Ok(T::from_value(self.getter.get(receiver)?)?)
    }

    /// Whether both handles share one compiled body
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.getter.ptr_eq(&other.getter)
    }
}

/// Writes a member through a fixed typed view
#[derive(Debug, Clone)]
pub struct TypedSetter {
    setter: Setter,
    view: TypedView,
}

impl TypedSetter {
    pub(crate) fn new(setter: Setter, view: TypedView) -> Self {
        Self { setter, view }
    }

    /// The view this accessor was compiled for
    pub fn view(&self) -> TypedView {
        self.view
    }

    /// Write the member
    pub fn set(&self, receiver: &Value, value: &Value) -> AccessorResult<()> {
        self.setter.set(receiver, value)
    }

    /// Convert a Rust value and write it
    pub fn set_from<T: Into<Value>>(&self, receiver: &Value, value: T) -> AccessorResult<()> {
        self.setter.set(receiver, &value.into())
    }

    /// Whether both handles share one compiled body
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.setter.ptr_eq(&other.setter)
    }
}
