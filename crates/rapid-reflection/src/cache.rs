//! Memoizing accessor cache
//!
//! Keys are `(registry, member or type, accessor kind, options, typed view)`.
//! Scoping by registry means a hit and a miss for the same key see the same
//! type relations. A
//! compiled accessor is built at most once per key from the point of view of
//! callers: concurrent misses may each compile, but the first insert wins and
//! every caller receives that entry.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use rapid_meta::{MemberId, RegistryId, TypeHandle};

use crate::accessor::{DefaultFactory, Factory, Getter, Invoker, Setter};
use crate::error::AccessorResult;
use crate::options::CompilationOptions;
use crate::typed::{TypedGetter, TypedSetter, TypedView};

static GLOBAL: Lazy<AccessorCache> = Lazy::new(AccessorCache::new);

/// What an accessor does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    /// Reads a field
    FieldGetter,
    /// Writes a field
    FieldSetter,
    /// Reads a property
    PropertyGetter,
    /// Writes a property
    PropertySetter,
    /// Calls a method
    MethodInvoker,
    /// Runs a constructor
    ConstructorFactory,
    /// Creates a default instance of a type
    DefaultFactory,
}

/// What an accessor was compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTarget {
    /// A field, property, method or constructor
    Member(MemberId),
    /// A type, for default factories
    Type(TypeHandle),
}

/// Identity of one compiled accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Registry the accessor was compiled against
    pub registry: RegistryId,
    /// Member or type
    pub target: CacheTarget,
    /// Accessor kind
    pub kind: AccessorKind,
    /// Options the body was compiled with
    pub options: CompilationOptions,
    /// Typed view, for typed getters and setters
    pub view: Option<TypedView>,
}

impl CacheKey {
    /// Key for a member accessor
    pub fn member(
        registry: RegistryId,
        id: MemberId,
        kind: AccessorKind,
        options: CompilationOptions,
    ) -> Self {
        Self {
            registry,
            target: CacheTarget::Member(id),
            kind,
            options,
            view: None,
        }
    }

    /// Key for a type-level accessor
    ///
    /// Default factories take no options, so every key for a type shares
    /// one entry.
    pub fn for_type(registry: RegistryId, handle: TypeHandle, kind: AccessorKind) -> Self {
        Self {
            registry,
            target: CacheTarget::Type(handle),
            kind,
            options: CompilationOptions::default(),
            view: None,
        }
    }

    /// Attach a typed view
    pub fn with_view(mut self, view: TypedView) -> Self {
        self.view = Some(view);
        self
    }
}

/// A cached accessor of any kind
#[derive(Debug, Clone)]
pub enum CompiledAccessor {
    /// Field or property reader
    Getter(Getter),
    /// Field or property writer
    Setter(Setter),
    /// Method invoker
    Invoker(Invoker),
    /// Constructor factory
    Factory(Factory),
    /// Default instance factory
    DefaultFactory(DefaultFactory),
    /// Typed reader
    TypedGetter(TypedGetter),
    /// Typed writer
    TypedSetter(TypedSetter),
}

/// Conversion between a concrete accessor handle and a cache entry
pub(crate) trait AccessorShape: Sized + Clone {
    fn into_compiled(self) -> CompiledAccessor;
    fn from_compiled(compiled: &CompiledAccessor) -> Option<Self>;
}

macro_rules! accessor_shape {
    ($($ty:ident),* $(,)?) => {
        $(
            impl AccessorShape for $ty {
                fn into_compiled(self) -> CompiledAccessor {
                    CompiledAccessor::$ty(self)
                }

                fn from_compiled(compiled: &CompiledAccessor) -> Option<Self> {
                    match compiled {
                        CompiledAccessor::$ty(accessor) => Some(accessor.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

accessor_shape!(Getter, Setter, Invoker, Factory, DefaultFactory, TypedGetter, TypedSetter);

/// Concurrent map from [`CacheKey`] to compiled accessors
///
/// Entries are never evicted.
pub struct AccessorCache {
    entries: DashMap<CacheKey, CompiledAccessor, FxBuildHasher>,
}

impl AccessorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// The process-wide cache
    pub fn global() -> &'static AccessorCache {
        &GLOBAL
    }

    /// Number of cached accessors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an accessor is cached for a key
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Cached accessor for a key
    pub fn get(&self, key: &CacheKey) -> Option<CompiledAccessor> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Return the cached accessor for `key`, compiling it on a miss
    ///
    /// Compilation runs without holding any shard lock. Failed compilations
    /// are not cached.
    pub(crate) fn get_or_compile<A, F>(
        &self,
        key: CacheKey,
        member: &str,
        compile: F,
    ) -> AccessorResult<A>
    where
        A: AccessorShape,
        F: FnOnce() -> AccessorResult<A>,
    {
        let hit = self
            .entries
            .get(&key)
            .and_then(|entry| A::from_compiled(entry.value()));
        if let Some(hit) = hit {
            trace!(target: "rapid_reflection::cache", kind = ?key.kind, member, "cache hit");
            return Ok(hit);
        }

        let compiled = compile()?;

        match self.entries.entry(key) {
            Entry::Occupied(existing) => {
                trace!(
                    target: "rapid_reflection::cache",
                    kind = ?key.kind,
                    member,
                    "lost compile race"
                );
                Ok(A::from_compiled(existing.get()).unwrap_or(compiled))
            }
            Entry::Vacant(slot) => {
                debug!(
                    target: "rapid_reflection::cache",
                    kind = ?key.kind,
                    member,
                    options = ?key.options,
                    typed = key.view.is_some(),
                    "compiled accessor"
                );
                slot.insert(compiled.clone().into_compiled());
                Ok(compiled)
            }
        }
    }
}

impl Default for AccessorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
