//! Rapid Reflection - compiled, cached member accessors
//!
//! Given a field, property, method or constructor descriptor from
//! `rapid-meta`, a [`Reflector`] compiles a reusable accessor once and hands
//! the same accessor back on every later request:
//! - [`Getter`] / [`Setter`] for fields and properties
//! - [`Invoker`] for methods of any arity and return type
//! - [`Factory`] for a specific constructor, [`DefaultFactory`] for a type
//! - [`TypedGetter`] / [`TypedSetter`] for a fixed `(owner, value)` view
//! - [`CompiledAccessor`] for a `MemberDescriptor` of any kind
//!
//! Accessor bodies are op streams over a closed instruction set (see
//! [`emit`]), built once per cache key and interpreted per call.
//!
//! ```ignore
//! let reflector = Reflector::new(registry);
//! let field = reflector.registry().by_name("Point").and_then(|t| t.field("x")).cloned();
//! let getter = reflector.field_getter(field.as_ref())?;
//! let x = getter.get(&point)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod accessor;
mod cache;
pub mod coerce;
mod compiler;
pub mod emit;
mod error;
mod options;
mod reflector;
mod typed;
mod validate;

pub use accessor::{DefaultFactory, Factory, Getter, Invoker, Setter};
pub use cache::{AccessorCache, AccessorKind, CacheKey, CacheTarget, CompiledAccessor};
pub use error::{AccessorError, AccessorResult, ErrorKind};
pub use options::{CacheMode, CompilationOptions, ReflectorOptions};
pub use reflector::Reflector;
pub use typed::{TypedGetter, TypedSetter, TypedView};
