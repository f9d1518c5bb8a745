//! Accessor errors
//!
//! Creation-time failures (`NullArgument`, `InvalidShape`) are raised while an
//! accessor is being compiled. Everything else surfaces when a compiled
//! accessor runs.

use rapid_meta::RuntimeError;
use thiserror::Error;

/// Accessor compilation and execution errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessorError {
    /// A required descriptor, receiver or argument array was absent
    #[error("Value cannot be null. (Parameter '{param}')")]
    NullArgument {
        /// Name of the absent parameter
        param: &'static str,
    },

    /// The member or type cannot back the requested accessor
    #[error("{message} (Parameter '{param}')")]
    InvalidShape {
        /// What is wrong with the member
        message: String,
        /// Parameter the shape check applies to
        param: &'static str,
    },

    /// The argument array is shorter than the parameter list
    #[error("Not enough arguments in the argument array: {required} required, {supplied} supplied. (Parameter '{param}')")]
    NotEnoughArguments {
        /// Name of the argument array parameter
        param: &'static str,
        /// Declared parameter count
        required: usize,
        /// Supplied argument count
        supplied: usize,
    },

    /// The generated op stream is malformed
    #[error("Accessor emission failed: {0}")]
    Emit(String),

    /// Fault raised while the accessor ran
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Coarse classification of an [`AccessorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input was absent; always declared
    NullArgument,
    /// The member does not fit the accessor kind, or the arguments are too few
    InvalidShape,
    /// A value could not be coerced to the required type
    TypeMismatch,
    /// A low-level fault from an unvalidated accessor
    UnguardedFault,
    /// The member body itself failed
    Member,
}

impl AccessorError {
    pub(crate) fn shape(message: impl Into<String>, param: &'static str) -> Self {
        AccessorError::InvalidShape {
            message: message.into(),
            param,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessorError::NullArgument { .. } => ErrorKind::NullArgument,
            AccessorError::InvalidShape { .. } | AccessorError::NotEnoughArguments { .. } => {
                ErrorKind::InvalidShape
            }
            AccessorError::Emit(_) => ErrorKind::InvalidShape,
            AccessorError::Runtime(RuntimeError::InvalidCast { .. }) => ErrorKind::TypeMismatch,
            AccessorError::Runtime(
                RuntimeError::NullReference
                | RuntimeError::IndexOutOfRange { .. }
                | RuntimeError::MissingImplementation { .. },
            ) => ErrorKind::UnguardedFault,
            AccessorError::Runtime(RuntimeError::Thrown(_)) => ErrorKind::Member,
        }
    }

    /// Name of the offending parameter, for declared errors
    pub fn param(&self) -> Option<&'static str> {
        match self {
            AccessorError::NullArgument { param }
            | AccessorError::InvalidShape { param, .. }
            | AccessorError::NotEnoughArguments { param, .. } => Some(param),
            AccessorError::Emit(_) | AccessorError::Runtime(_) => None,
        }
    }
}

/// Result type for accessor operations
pub type AccessorResult<T> = Result<T, AccessorError>;
