//! Process-unique identities for registries, types, members and virtual slots
//!
//! Handles are allocated from global counters, so two registries built in the
//! same process never hand out the same identity. Accessor caches key on these
//! values directly.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// First handle value available to user-defined types
const FIRST_USER_TYPE: u32 = 64;

static NEXT_TYPE_HANDLE: AtomicU32 = AtomicU32::new(FIRST_USER_TYPE);
static NEXT_MEMBER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_VIRTUAL_SLOT: AtomicU32 = AtomicU32::new(0);
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a built registry, shared by its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(u64);

impl RegistryId {
    pub(crate) fn next() -> Self {
        RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an identity from its raw value
    pub const fn from_raw(raw: u64) -> Self {
        RegistryId(raw)
    }

    /// Raw registry identity
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry#{}", self.0)
    }
}

/// Identity of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(u32);

impl TypeHandle {
    /// The absence of a value (method return type only)
    pub const VOID: TypeHandle = TypeHandle(0);
    /// Root of every type hierarchy
    pub const OBJECT: TypeHandle = TypeHandle(1);
    /// Boolean value type
    pub const BOOL: TypeHandle = TypeHandle(2);
    /// 32-bit signed integer value type
    pub const INT32: TypeHandle = TypeHandle(3);
    /// 64-bit signed integer value type
    pub const INT64: TypeHandle = TypeHandle(4);
    /// 64-bit float value type
    pub const FLOAT64: TypeHandle = TypeHandle(5);
    /// Immutable string reference type
    pub const STRING: TypeHandle = TypeHandle(6);

    /// All built-in handles, in registration order
    pub const BUILTINS: [TypeHandle; 7] = [
        Self::VOID,
        Self::OBJECT,
        Self::BOOL,
        Self::INT32,
        Self::INT64,
        Self::FLOAT64,
        Self::STRING,
    ];

    pub(crate) fn next() -> Self {
        TypeHandle(NEXT_TYPE_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild a handle from its raw value
    ///
    /// The handle is only meaningful if some registry defined it.
    pub const fn from_raw(raw: u32) -> Self {
        TypeHandle(raw)
    }

    /// Raw handle value
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Whether this handle names one of the built-in types
    pub const fn is_builtin(self) -> bool {
        self.0 < FIRST_USER_TYPE
    }

    /// Name of a built-in type, `None` for user types
    pub fn builtin_name(self) -> Option<&'static str> {
        match self {
            Self::VOID => Some("Void"),
            Self::OBJECT => Some("Object"),
            Self::BOOL => Some("Bool"),
            Self::INT32 => Some("Int32"),
            Self::INT64 => Some("Int64"),
            Self::FLOAT64 => Some("Float64"),
            Self::STRING => Some("String"),
            _ => None,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type#{}", self.0),
        }
    }
}

/// Identity of a field, property, method or constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u64);

impl MemberId {
    pub(crate) fn next() -> Self {
        MemberId(NEXT_MEMBER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an identity from its raw value
    pub const fn from_raw(raw: u64) -> Self {
        MemberId(raw)
    }

    /// Raw member identity
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// Dispatch slot shared by a virtual method and all of its overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualSlot(u32);

impl VirtualSlot {
    pub(crate) fn next() -> Self {
        VirtualSlot(NEXT_VIRTUAL_SLOT.fetch_add(1, Ordering::Relaxed))
    }
}
