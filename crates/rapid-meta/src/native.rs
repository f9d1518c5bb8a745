//! Native member bodies
//!
//! Methods, property accessors and constructors are implemented as Rust
//! closures. A body receives an [`Invocation`] carrying the receiver and
//! the already-coerced arguments.

use std::sync::Arc;

use crate::error::RuntimeError;
use crate::object::ObjectRef;
use crate::value::{FromValue, Value};

/// Body of a method or property accessor
pub type NativeMethod = Arc<dyn Fn(&Invocation<'_>) -> Result<Value, RuntimeError> + Send + Sync>;

/// Initializer run on a freshly zeroed instance
pub type NativeConstructor = Arc<dyn Fn(&Invocation<'_>) -> Result<(), RuntimeError> + Send + Sync>;

/// Receiver and arguments of a single native call
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    this: Option<&'a ObjectRef>,
    args: &'a [Value],
}

impl<'a> Invocation<'a> {
    /// Create an invocation
    pub fn new(this: Option<&'a ObjectRef>, args: &'a [Value]) -> Self {
        Self { this, args }
    }

    /// The receiver, `NullReference` for static calls
    pub fn this(&self) -> Result<&'a ObjectRef, RuntimeError> {
        self.this.ok_or(RuntimeError::NullReference)
    }

    /// All arguments
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Argument at `index`
    pub fn arg(&self, index: usize) -> Result<&'a Value, RuntimeError> {
        self.args.get(index).ok_or(RuntimeError::IndexOutOfRange {
            index,
            len: self.args.len(),
        })
    }

    /// Argument at `index`, converted
    pub fn arg_as<T: FromValue>(&self, index: usize) -> Result<T, RuntimeError> {
        T::from_value(self.arg(index)?.clone())
    }
}

/// Wrap a closure as a method body
pub fn method<F>(f: F) -> NativeMethod
where
    F: Fn(&Invocation<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a constructor body
pub fn constructor<F>(f: F) -> NativeConstructor
where
    F: Fn(&Invocation<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
{
    Arc::new(f)
}
