//! Error types for metadata construction and native member execution

use thiserror::Error;

use crate::handle::TypeHandle;

/// Failure raised while executing a member body or a compiled accessor
///
/// These mirror the managed runtime faults a reflective call can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A member was accessed through an absent receiver
    #[error("Object reference not set to an instance of an object.")]
    NullReference,

    /// An argument index was past the end of the argument array
    #[error("Index {index} was outside the bounds of the array (length {len}).")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Array length
        len: usize,
    },

    /// A value could not be converted to the required type
    #[error("Unable to cast object of type '{from}' to type '{to}'.")]
    InvalidCast {
        /// Runtime type of the value
        from: String,
        /// Required type
        to: String,
    },

    /// A virtual call resolved to a member without a body
    #[error("Method '{method}' has no implementation on type '{type_name}'.")]
    MissingImplementation {
        /// Method name
        method: String,
        /// Runtime type of the receiver
        type_name: String,
    },

    /// A member body raised its own failure
    #[error("{0}")]
    Thrown(String),
}

impl RuntimeError {
    /// Shorthand for a failure raised by a native member body
    pub fn thrown(message: impl Into<String>) -> Self {
        RuntimeError::Thrown(message.into())
    }
}

/// Failure raised while defining types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetaError {
    /// A handle did not resolve in the registry being built
    #[error("Unknown type: {0}")]
    UnknownType(TypeHandle),

    /// A type with the same name is already defined
    #[error("Duplicate type name: {0}")]
    DuplicateType(String),

    /// The requested base type cannot be derived from
    #[error("Type '{type_name}' cannot derive from '{base}': {reason}")]
    InvalidBase {
        /// Type being defined
        type_name: String,
        /// Requested base
        base: String,
        /// Why the base was rejected
        reason: &'static str,
    },

    /// An implemented type is not an interface
    #[error("Type '{type_name}' cannot implement '{interface}': not an interface")]
    NotAnInterface {
        /// Type being defined
        type_name: String,
        /// Offending type
        interface: String,
    },

    /// A property names a backing field that does not exist
    #[error("Property '{property}' on '{type_name}' is backed by unknown field '{field}'")]
    UnknownBackingField {
        /// Type being defined
        type_name: String,
        /// Property name
        property: String,
        /// Missing field name
        field: String,
    },

    /// An override has no virtual method to override
    #[error("Method '{method}' on '{type_name}' overrides nothing")]
    NothingToOverride {
        /// Type being defined
        type_name: String,
        /// Method name
        method: String,
    },

    /// A concrete type leaves an interface member unimplemented
    #[error("Type '{type_name}' does not implement '{interface}.{member}'")]
    UnimplementedMember {
        /// Type being defined
        type_name: String,
        /// Interface declaring the member
        interface: String,
        /// Member name
        member: String,
    },

    /// A member shape is not valid for the kind of type declaring it
    #[error("Invalid member '{member}' on '{type_name}': {reason}")]
    InvalidMember {
        /// Type being defined
        type_name: String,
        /// Member name
        member: String,
        /// Why the member was rejected
        reason: &'static str,
    },
}

/// Result type for metadata construction
pub type MetaResult<T> = Result<T, MetaError>;
