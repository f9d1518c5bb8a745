//! Member descriptors
//!
//! Descriptors are created by the registry builder and shared through `Arc`.
//! Their `id` is the identity accessor caches key on.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handle::{MemberId, TypeHandle, VirtualSlot};
use crate::native::{NativeConstructor, NativeMethod};
use crate::value::Value;

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Accessible everywhere
    #[default]
    Public,
    /// Accessible to the declaring type and its subtypes
    Protected,
    /// Accessible within the declaring assembly
    Internal,
    /// Accessible to the declaring type only
    Private,
}

impl Visibility {
    /// Check if the member is public
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

/// Parameter information
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Declared parameter type
    pub parameter_type: TypeHandle,
    /// Zero-based position
    pub position: usize,
}

/// Shared storage cell of a static field
#[derive(Clone, Default)]
pub struct StaticCell(Arc<RwLock<Value>>);

impl StaticCell {
    pub(crate) fn new(value: Value) -> Self {
        StaticCell(Arc::new(RwLock::new(value)))
    }

    /// Read the current value
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    /// Replace the current value
    pub fn set(&self, value: Value) {
        *self.0.write() = value;
    }
}

impl fmt::Debug for StaticCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StaticCell({:?})", self.0.read())
    }
}

/// Where a field's value lives
#[derive(Debug, Clone)]
pub enum FieldStorage {
    /// Slot index in the instance layout
    Instance(usize),
    /// Type-level storage shared by all instances
    Static(StaticCell),
}

/// Field information
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Member identity
    pub id: MemberId,
    /// Field name
    pub name: String,
    /// Declaring type
    pub declaring_type: TypeHandle,
    /// Declared field type
    pub field_type: TypeHandle,
    /// Field visibility
    pub visibility: Visibility,
    /// Field storage
    pub storage: FieldStorage,
}

impl FieldInfo {
    /// Whether the field is static
    pub fn is_static(&self) -> bool {
        matches!(self.storage, FieldStorage::Static(_))
    }

    /// Instance slot, `None` for static fields
    pub fn slot(&self) -> Option<usize> {
        match self.storage {
            FieldStorage::Instance(slot) => Some(slot),
            FieldStorage::Static(_) => None,
        }
    }
}

/// Method information
#[derive(Clone)]
pub struct MethodInfo {
    /// Member identity
    pub id: MemberId,
    /// Method name
    pub name: String,
    /// Declaring type
    pub declaring_type: TypeHandle,
    /// Parameter infos
    pub parameters: Vec<ParameterInfo>,
    /// Return type, `TypeHandle::VOID` for none
    pub return_type: TypeHandle,
    /// Method visibility
    pub visibility: Visibility,
    /// Whether the method is static
    pub is_static: bool,
    /// Dispatch slot for virtual and interface methods
    pub virtual_slot: Option<VirtualSlot>,
    /// Implementation, `None` for abstract methods
    pub body: Option<NativeMethod>,
}

impl MethodInfo {
    /// Whether the method returns nothing
    pub fn returns_void(&self) -> bool {
        self.return_type == TypeHandle::VOID
    }

    /// Whether calls go through dynamic dispatch
    pub fn is_virtual(&self) -> bool {
        self.virtual_slot.is_some()
    }

    /// Whether the method has no body
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// Declared parameter types in order
    pub fn parameter_types(&self) -> Vec<TypeHandle> {
        self.parameters.iter().map(|p| p.parameter_type).collect()
    }

    /// Check if name and parameter types match
    pub fn matches_signature(&self, name: &str, parameter_types: &[TypeHandle]) -> bool {
        self.name == name
            && self.parameters.len() == parameter_types.len()
            && self
                .parameters
                .iter()
                .zip(parameter_types)
                .all(|(p, t)| p.parameter_type == *t)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("virtual_slot", &self.virtual_slot)
            .field("abstract", &self.body.is_none())
            .finish()
    }
}

/// Property information
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// Member identity
    pub id: MemberId,
    /// Property name
    pub name: String,
    /// Declaring type
    pub declaring_type: TypeHandle,
    /// Declared property type
    pub property_type: TypeHandle,
    /// Get accessor, if any
    pub getter: Option<Arc<MethodInfo>>,
    /// Set accessor, if any
    pub setter: Option<Arc<MethodInfo>>,
    /// Index parameters, empty for ordinary properties
    pub index_parameters: Vec<ParameterInfo>,
}

impl PropertyInfo {
    /// Whether the property takes index parameters
    pub fn is_indexed(&self) -> bool {
        !self.index_parameters.is_empty()
    }

    /// Whether the property is static
    pub fn is_static(&self) -> bool {
        self.getter
            .as_ref()
            .or(self.setter.as_ref())
            .is_some_and(|m| m.is_static)
    }

    /// The get accessor, filtered by visibility
    pub fn get_method(&self, include_non_public: bool) -> Option<&Arc<MethodInfo>> {
        self.getter
            .as_ref()
            .filter(|m| include_non_public || m.visibility.is_public())
    }

    /// The set accessor, filtered by visibility
    pub fn set_method(&self, include_non_public: bool) -> Option<&Arc<MethodInfo>> {
        self.setter
            .as_ref()
            .filter(|m| include_non_public || m.visibility.is_public())
    }
}

/// Constructor information
#[derive(Clone)]
pub struct ConstructorInfo {
    /// Member identity
    pub id: MemberId,
    /// Declaring type
    pub declaring_type: TypeHandle,
    /// Parameter infos
    pub parameters: Vec<ParameterInfo>,
    /// Constructor visibility
    pub visibility: Visibility,
    /// Initializer run on the zeroed instance, `None` keeps field defaults
    pub body: Option<NativeConstructor>,
}

impl ConstructorInfo {
    /// Declared parameter types in order
    pub fn parameter_types(&self) -> Vec<TypeHandle> {
        self.parameters.iter().map(|p| p.parameter_type).collect()
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("id", &self.id)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// Any member descriptor
#[derive(Debug, Clone)]
pub enum MemberDescriptor {
    /// A field
    Field(Arc<FieldInfo>),
    /// A property
    Property(Arc<PropertyInfo>),
    /// A method
    Method(Arc<MethodInfo>),
    /// A constructor
    Constructor(Arc<ConstructorInfo>),
}

impl MemberDescriptor {
    /// Member identity
    pub fn id(&self) -> MemberId {
        match self {
            MemberDescriptor::Field(f) => f.id,
            MemberDescriptor::Property(p) => p.id,
            MemberDescriptor::Method(m) => m.id,
            MemberDescriptor::Constructor(c) => c.id,
        }
    }

    /// Member name; constructors are named `.ctor`
    pub fn name(&self) -> &str {
        match self {
            MemberDescriptor::Field(f) => &f.name,
            MemberDescriptor::Property(p) => &p.name,
            MemberDescriptor::Method(m) => &m.name,
            MemberDescriptor::Constructor(_) => ".ctor",
        }
    }

    /// Declaring type
    pub fn declaring_type(&self) -> TypeHandle {
        match self {
            MemberDescriptor::Field(f) => f.declaring_type,
            MemberDescriptor::Property(p) => p.declaring_type,
            MemberDescriptor::Method(m) => m.declaring_type,
            MemberDescriptor::Constructor(c) => c.declaring_type,
        }
    }
}
