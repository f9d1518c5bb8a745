//! Type table entries
//!
//! A `TypeDef` is frozen once defined. It carries its full ancestor set
//! (base chain plus every implemented interface) so subtype checks never
//! walk the registry, and a vtable binding each virtual slot to the most
//! derived implementation.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::handle::{TypeHandle, VirtualSlot};
use crate::member::{ConstructorInfo, FieldInfo, MemberDescriptor, MethodInfo, PropertyInfo};
use crate::value::Value;

/// Built-in primitive value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `Bool`
    Bool,
    /// `Int32`
    Int32,
    /// `Int64`
    Int64,
    /// `Float64`
    Float64,
}

/// Type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The void pseudo-type
    Void,
    /// Built-in value type
    Primitive(PrimitiveKind),
    /// Reference type with identity
    Class,
    /// User-defined value type, copied on every boundary crossing
    Struct,
    /// Contract implemented by classes and structs
    Interface,
}

/// A defined type
pub struct TypeDef {
    pub(crate) handle: TypeHandle,
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) is_abstract: bool,
    pub(crate) is_sealed: bool,
    pub(crate) base: Option<TypeHandle>,
    pub(crate) interfaces: Vec<TypeHandle>,
    pub(crate) ancestors: FxHashSet<TypeHandle>,
    pub(crate) fields: Vec<Arc<FieldInfo>>,
    pub(crate) inherited_fields: Vec<Arc<FieldInfo>>,
    pub(crate) layout: Vec<Arc<FieldInfo>>,
    pub(crate) field_defaults: Vec<Value>,
    pub(crate) properties: Vec<Arc<PropertyInfo>>,
    pub(crate) inherited_properties: Vec<Arc<PropertyInfo>>,
    pub(crate) methods: Vec<Arc<MethodInfo>>,
    pub(crate) inherited_methods: Vec<Arc<MethodInfo>>,
    pub(crate) constructors: Vec<Arc<ConstructorInfo>>,
    pub(crate) vtable: FxHashMap<VirtualSlot, Arc<MethodInfo>>,
}

impl TypeDef {
    pub(crate) fn empty(handle: TypeHandle, name: String, kind: TypeKind) -> Self {
        let mut ancestors = FxHashSet::default();
        ancestors.insert(handle);
        if kind != TypeKind::Void {
            ancestors.insert(TypeHandle::OBJECT);
        }
        Self {
            handle,
            name,
            kind,
            is_abstract: false,
            is_sealed: matches!(kind, TypeKind::Primitive(_) | TypeKind::Struct),
            base: None,
            interfaces: Vec::new(),
            ancestors,
            fields: Vec::new(),
            inherited_fields: Vec::new(),
            layout: Vec::new(),
            field_defaults: Vec::new(),
            properties: Vec::new(),
            inherited_properties: Vec::new(),
            methods: Vec::new(),
            inherited_methods: Vec::new(),
            constructors: Vec::new(),
            vtable: FxHashMap::default(),
        }
    }

    /// Type handle
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Base class, `None` for roots, structs and interfaces
    pub fn base(&self) -> Option<TypeHandle> {
        self.base
    }

    /// Directly implemented (or, for interfaces, extended) interfaces
    pub fn interfaces(&self) -> &[TypeHandle] {
        &self.interfaces
    }

    /// Whether the type cannot be instantiated
    ///
    /// Interfaces are always abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract || self.kind == TypeKind::Interface
    }

    /// Whether the type cannot be derived from
    pub fn is_sealed(&self) -> bool {
        self.is_sealed
    }

    /// Whether the type is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether values of the type are copied rather than shared
    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_) | TypeKind::Struct)
    }

    /// Whether null is a valid value of the type
    pub fn accepts_null(&self) -> bool {
        !self.is_value_type()
    }

    /// Whether `target` is this type or one of its ancestors
    pub fn is_subtype_of(&self, target: TypeHandle) -> bool {
        self.ancestors.contains(&target)
    }

    /// Every type this type is assignable to, itself included
    pub fn ancestors(&self) -> impl Iterator<Item = TypeHandle> + '_ {
        self.ancestors.iter().copied()
    }

    /// Instance fields in slot order, inherited first
    pub fn layout(&self) -> &[Arc<FieldInfo>] {
        &self.layout
    }

    /// Default slot values for a zeroed instance
    pub fn field_defaults(&self) -> &[Value] {
        &self.field_defaults
    }

    /// Slot of an instance field by name
    pub fn instance_slot(&self, name: &str) -> Option<usize> {
        self.layout
            .iter()
            .rev()
            .find(|f| f.name == name)
            .and_then(|f| f.slot())
    }

    /// Look up a field, declared members first
    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields
            .iter()
            .chain(&self.inherited_fields)
            .find(|f| f.name == name)
    }

    /// All fields, declared then inherited
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldInfo>> {
        self.fields.iter().chain(&self.inherited_fields)
    }

    /// Look up a property, declared members first
    pub fn property(&self, name: &str) -> Option<&Arc<PropertyInfo>> {
        self.properties
            .iter()
            .chain(&self.inherited_properties)
            .find(|p| p.name == name)
    }

    /// All properties, declared then inherited
    pub fn properties(&self) -> impl Iterator<Item = &Arc<PropertyInfo>> {
        self.properties.iter().chain(&self.inherited_properties)
    }

    /// Look up a method by name, declared members first
    pub fn method(&self, name: &str) -> Option<&Arc<MethodInfo>> {
        self.methods().find(|m| m.name == name)
    }

    /// Look up a method by name and parameter types
    pub fn method_with(
        &self,
        name: &str,
        parameter_types: &[TypeHandle],
    ) -> Option<&Arc<MethodInfo>> {
        self.methods().find(|m| m.matches_signature(name, parameter_types))
    }

    /// All methods, declared then inherited
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodInfo>> {
        self.methods.iter().chain(&self.inherited_methods)
    }

    /// Declared constructors
    pub fn constructors(&self) -> &[Arc<ConstructorInfo>] {
        &self.constructors
    }

    /// Constructor with the given parameter types
    pub fn constructor(&self, parameter_types: &[TypeHandle]) -> Option<&Arc<ConstructorInfo>> {
        self.constructors
            .iter()
            .find(|c| c.parameter_types() == parameter_types)
    }

    /// Public parameterless constructor
    pub fn default_constructor(&self) -> Option<&Arc<ConstructorInfo>> {
        self.constructors
            .iter()
            .find(|c| c.parameters.is_empty() && c.visibility.is_public())
    }

    /// Look up any member by name
    ///
    /// Fields are preferred over properties, properties over methods.
    pub fn member(&self, name: &str) -> Option<MemberDescriptor> {
        if let Some(field) = self.field(name) {
            return Some(MemberDescriptor::Field(Arc::clone(field)));
        }
        if let Some(property) = self.property(name) {
            return Some(MemberDescriptor::Property(Arc::clone(property)));
        }
        self.method(name)
            .map(|m| MemberDescriptor::Method(Arc::clone(m)))
    }

    /// Most derived implementation of `method` for instances of this type
    ///
    /// Non-virtual methods resolve to themselves.
    pub fn resolve_virtual(&self, method: &Arc<MethodInfo>) -> Option<Arc<MethodInfo>> {
        match method.virtual_slot {
            Some(slot) => self
                .vtable
                .get(&slot)
                .cloned()
                .or_else(|| method.body.as_ref().map(|_| Arc::clone(method))),
            None => Some(Arc::clone(method)),
        }
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("is_abstract", &self.is_abstract)
            .field("base", &self.base)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}
