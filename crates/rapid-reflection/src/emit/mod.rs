//! Code-generation backend
//!
//! Accessor bodies are op streams over a small closed instruction set,
//! emitted once per accessor by [`IlBuilder`] and executed per call by
//! [`DynamicMethod::invoke`].

mod builder;
mod exec;
mod opcode;

pub use builder::{IlBuilder, ValidationResult};
pub use exec::{DynamicMethod, Frame};
pub use opcode::{Label, Op};
