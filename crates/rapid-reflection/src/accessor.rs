//! Compiled accessor handles
//!
//! Each handle wraps a shared [`DynamicMethod`]. Clones are cheap, and two
//! handles handed out by the cache for the same key are `ptr_eq`.

use std::fmt;
use std::sync::Arc;

use rapid_meta::Value;

use crate::emit::{DynamicMethod, Frame};
use crate::error::AccessorResult;

macro_rules! accessor_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            method: Arc<DynamicMethod>,
        }

        impl $name {
            pub(crate) fn new(method: DynamicMethod) -> Self {
                Self {
                    method: Arc::new(method),
                }
            }

            /// Accessor name
            pub fn name(&self) -> &str {
                self.method.name()
            }

            /// Compiled body
            pub fn body(&self) -> &DynamicMethod {
                &self.method
            }

            /// Whether both handles share one compiled body
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.method, &other.method)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.method.name())
            }
        }
    };
}

accessor_handle!(
    /// Reads a field or property
    Getter
);

accessor_handle!(
    /// Writes a field or property
    Setter
);

accessor_handle!(
    /// Invokes a method
    Invoker
);

accessor_handle!(
    /// Runs a specific constructor
    Factory
);

accessor_handle!(
    /// Creates a default instance of a type
    DefaultFactory
);

impl Getter {
    /// Read the member; the receiver is ignored for static members
    pub fn get(&self, receiver: &Value) -> AccessorResult<Value> {
        self.method.invoke(Frame::getter(receiver))
    }
}

impl Setter {
    /// Write the member; the receiver is ignored for static members
    ///
    /// A boxed struct receiver is mutated in place.
    pub fn set(&self, receiver: &Value, value: &Value) -> AccessorResult<()> {
        self.method.invoke(Frame::setter(receiver, value)).map(|_| ())
    }
}

impl Invoker {
    /// Call the method; void methods return null
    ///
    /// Arguments past the declared parameter count are ignored.
    pub fn invoke(&self, receiver: &Value, arguments: Option<&[Value]>) -> AccessorResult<Value> {
        self.method.invoke(Frame::invoker(receiver, arguments))
    }
}

impl Factory {
    /// Construct an instance
    ///
    /// Arguments past the declared parameter count are ignored.
    pub fn create(&self, arguments: Option<&[Value]>) -> AccessorResult<Value> {
        self.method.invoke(Frame::factory(arguments))
    }
}

impl DefaultFactory {
    /// Construct a default instance
    pub fn create(&self) -> AccessorResult<Value> {
        self.method.invoke(Frame::factory(None))
    }
}
