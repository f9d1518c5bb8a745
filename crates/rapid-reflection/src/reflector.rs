//! Entry point for compiling accessors
//!
//! A [`Reflector`] pairs a [`TypeRegistry`] with options and a cache. The
//! compiler operations live in `crate::compiler`, one module per member kind.

use std::sync::Arc;

use rapid_meta::{TypeDef, TypeHandle, TypeRegistry};

use crate::cache::AccessorCache;
use crate::error::{AccessorError, AccessorResult};
use crate::options::{CacheMode, CompilationOptions, ReflectorOptions};

/// Compiles and memoizes member accessors
#[derive(Debug, Clone)]
pub struct Reflector {
    registry: TypeRegistry,
    options: ReflectorOptions,
}

impl Reflector {
    /// Create a reflector backed by the process-wide cache
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_options(registry, ReflectorOptions::default())
    }

    /// Create a reflector with explicit options
    pub fn with_options(registry: TypeRegistry, options: ReflectorOptions) -> Self {
        Self { registry, options }
    }

    /// Registry used for type relations
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Reflector options
    pub fn options(&self) -> &ReflectorOptions {
        &self.options
    }

    /// Options used by the `*_default` operations
    pub fn defaults(&self) -> CompilationOptions {
        self.options.defaults
    }

    /// Cache this reflector memoizes into
    pub fn cache(&self) -> &AccessorCache {
        match &self.options.cache {
            CacheMode::Global => AccessorCache::global(),
            CacheMode::Private(cache) => cache,
        }
    }

    pub(crate) fn type_def(
        &self,
        handle: TypeHandle,
        param: &'static str,
    ) -> AccessorResult<Arc<TypeDef>> {
        self.registry
            .get(handle)
            .cloned()
            .ok_or_else(|| AccessorError::shape(format!("Unknown type '{}'.", handle), param))
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}
