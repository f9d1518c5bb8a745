//! Rapid Meta - runtime type and member metadata
//!
//! This crate provides the reflection facility that `rapid-reflection` compiles
//! accessors against:
//! - Type handles and member identities (`TypeHandle`, `MemberId`)
//! - The dynamic value model (`Value`, `Object`)
//! - Member descriptors (`FieldInfo`, `PropertyInfo`, `MethodInfo`, `ConstructorInfo`)
//! - Type definitions and an immutable, shareable `TypeRegistry`
//!
//! Types are declared with definition builders and frozen into a registry:
//!
//! ```ignore
//! let mut builder = TypeRegistry::builder();
//! let point = builder.define(
//!     TypeDefinition::structure("Point")
//!         .field(FieldDefinition::new("x", TypeHandle::INT32))
//!         .field(FieldDefinition::new("y", TypeHandle::INT32)),
//! )?;
//! let registry = builder.build();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod definition;
pub mod error;
pub mod handle;
pub mod member;
pub mod native;
pub mod object;
pub mod registry;
pub mod types;
pub mod value;

pub use definition::{
    AccessorBody, AccessorDefinition, ConstructorDefinition, Dispatch, FieldDefinition,
    MethodDefinition, ParameterDefinition, PropertyBacking, PropertyDefinition, TypeDefinition,
};
pub use error::{MetaError, MetaResult, RuntimeError};
pub use handle::{MemberId, RegistryId, TypeHandle, VirtualSlot};
pub use member::{
    ConstructorInfo, FieldInfo, FieldStorage, MemberDescriptor, MethodInfo, ParameterInfo,
    PropertyInfo, StaticCell, Visibility,
};
pub use native::{Invocation, NativeConstructor, NativeMethod};
pub use object::{Object, ObjectRef};
pub use registry::{create_standard_registry, TypeRegistry, TypeRegistryBuilder};
pub use types::{PrimitiveKind, TypeDef, TypeKind};
pub use value::{FromValue, Value};
