//! Compilation and reflector options

use std::fmt;
use std::sync::Arc;

use crate::cache::AccessorCache;

/// Options that change the body of a compiled accessor
///
/// Part of the cache key; compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilationOptions {
    /// Emit receiver and argument-array checks in invokers and factories
    pub validate_arguments: bool,
    /// Allow non-public property accessors
    pub include_non_public: bool,
}

impl CompilationOptions {
    /// Set argument validation
    pub fn validate_arguments(mut self, validate: bool) -> Self {
        self.validate_arguments = validate;
        self
    }

    /// Set non-public accessor resolution
    pub fn include_non_public(mut self, include: bool) -> Self {
        self.include_non_public = include;
        self
    }
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            validate_arguments: true,
            include_non_public: true,
        }
    }
}

/// Which cache a reflector memoizes into
#[derive(Clone, Default)]
pub enum CacheMode {
    /// The process-wide cache
    #[default]
    Global,
    /// A cache owned by this reflector (and its clones)
    Private(Arc<AccessorCache>),
}

impl CacheMode {
    /// A fresh private cache
    pub fn private() -> Self {
        CacheMode::Private(Arc::new(AccessorCache::new()))
    }
}

impl fmt::Debug for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Global => write!(f, "Global"),
            CacheMode::Private(cache) => write!(f, "Private({} entries)", cache.len()),
        }
    }
}

/// Options for creating a Reflector
#[derive(Debug, Clone, Default)]
pub struct ReflectorOptions {
    /// Cache used for memoization
    pub cache: CacheMode,
    /// Options used by the `*_default` operations
    pub defaults: CompilationOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilationOptions::default();
        assert!(options.validate_arguments);
        assert!(options.include_non_public);

        let reflector = ReflectorOptions::default();
        assert!(matches!(reflector.cache, CacheMode::Global));
    }

    #[test]
    fn test_builder_setters() {
        let options = CompilationOptions::default()
            .validate_arguments(false)
            .include_non_public(false);
        assert_ne!(options, CompilationOptions::default());
        assert!(!options.validate_arguments);
    }
}
