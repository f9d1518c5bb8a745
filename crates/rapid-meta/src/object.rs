//! Object model
//!
//! Every class instance and every boxed struct is an `Object`: a type
//! reference plus a slot vector laid out by the type's instance fields
//! (inherited fields first).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RuntimeError;
use crate::handle::TypeHandle;
use crate::types::TypeDef;
use crate::value::Value;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared reference to a heap object
pub type ObjectRef = Arc<Object>;

/// Object instance (heap-allocated)
pub struct Object {
    object_id: u64,
    type_def: Arc<TypeDef>,
    fields: RwLock<Vec<Value>>,
}

impl Object {
    /// Create an instance with every field at its declared default
    ///
    /// No constructor body runs.
    pub fn zeroed(type_def: &Arc<TypeDef>) -> ObjectRef {
        let fields = type_def.field_defaults().iter().map(Value::detach).collect();
        Arc::new(Self {
            object_id: generate_object_id(),
            type_def: Arc::clone(type_def),
            fields: RwLock::new(fields),
        })
    }

    /// Unique object ID
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// Runtime type of the object
    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.type_def
    }

    /// Handle of the runtime type
    pub fn type_handle(&self) -> TypeHandle {
        self.type_def.handle()
    }

    /// Get number of field slots
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }

    /// Read a field slot
    pub fn load(&self, slot: usize) -> Result<Value, RuntimeError> {
        let fields = self.fields.read();
        fields
            .get(slot)
            .cloned()
            .ok_or(RuntimeError::IndexOutOfRange {
                index: slot,
                len: fields.len(),
            })
    }

    /// Write a field slot
    pub fn store(&self, slot: usize, value: Value) -> Result<(), RuntimeError> {
        let mut fields = self.fields.write();
        let len = fields.len();
        match fields.get_mut(slot) {
            Some(field) => {
                *field = value;
                Ok(())
            }
            None => Err(RuntimeError::IndexOutOfRange { index: slot, len }),
        }
    }

    /// Read an instance field by name
    pub fn get(&self, name: &str) -> Option<Value> {
        let slot = self.type_def.instance_slot(name)?;
        self.load(slot).ok()
    }

    /// Write an instance field by name, returning whether the field exists
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        match self.type_def.instance_slot(name) {
            Some(slot) => self.store(slot, value.into()).is_ok(),
            None => false,
        }
    }

    /// Copy of the slot vector taken under the read lock
    pub(crate) fn snapshot(&self) -> Vec<Value> {
        self.fields.read().clone()
    }

    /// Deep copy used when a boxed struct is passed by value
    pub(crate) fn duplicate(&self) -> Object {
        let fields = self.fields.read().iter().map(Value::detach).collect();
        Object {
            object_id: generate_object_id(),
            type_def: Arc::clone(&self.type_def),
            fields: RwLock::new(fields),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_def.name(), self.object_id)
    }
}
