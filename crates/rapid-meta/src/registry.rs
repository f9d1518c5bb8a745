//! Type registry
//!
//! The registry maps `TypeHandle` to `TypeDef`. It is built once through
//! [`TypeRegistryBuilder`] and then shared immutably; cloning is cheap.
//!
//! Types must be defined in dependency order: a base class, an implemented
//! interface or a field type has to be defined before the type using it.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::definition::{
    AccessorBody, AccessorDefinition, Dispatch, ParameterDefinition, PropertyBacking,
    PropertyDefinition, TypeDefinition,
};
use crate::error::{MetaError, MetaResult};
use crate::handle::{MemberId, RegistryId, TypeHandle, VirtualSlot};
use crate::member::{
    ConstructorInfo, FieldInfo, FieldStorage, MethodInfo, ParameterInfo, PropertyInfo, StaticCell,
    Visibility,
};
use crate::native::{self, NativeMethod};
use crate::types::{PrimitiveKind, TypeDef, TypeKind};
use crate::value::Value;

/// Registry of defined types
///
/// Thread-safe and immutable once built.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    id: RegistryId,
    types: Arc<FxHashMap<TypeHandle, Arc<TypeDef>>>,
    names: Arc<FxHashMap<String, TypeHandle>>,
}

impl TypeRegistry {
    /// Create a registry containing only the built-in types
    pub fn new() -> Self {
        create_standard_registry()
    }

    /// Create a registry builder preloaded with the built-in types
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::with_builtins()
    }

    /// Identity of this registry; clones share it
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Get a type by handle
    pub fn get(&self, handle: TypeHandle) -> Option<&Arc<TypeDef>> {
        self.types.get(&handle)
    }

    /// Get a type by name
    pub fn by_name(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.names.get(name).and_then(|h| self.types.get(h))
    }

    /// Check if a type is registered
    pub fn contains(&self, handle: TypeHandle) -> bool {
        self.types.contains_key(&handle)
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all registered types
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDef>> {
        self.types.values()
    }

    /// Whether a value of type `source` can be used where `target` is expected
    pub fn is_assignable_from(&self, target: TypeHandle, source: TypeHandle) -> bool {
        target == source
            || self
                .types
                .get(&source)
                .is_some_and(|s| s.is_subtype_of(target))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a type registry
pub struct TypeRegistryBuilder {
    types: FxHashMap<TypeHandle, Arc<TypeDef>>,
    names: FxHashMap<String, TypeHandle>,
}

/// A method about to be added to a type
struct MethodSpec {
    name: String,
    parameters: Vec<ParameterInfo>,
    return_type: TypeHandle,
    visibility: Visibility,
    is_static: bool,
    dispatch: Dispatch,
    body: Option<NativeMethod>,
}

impl TypeRegistryBuilder {
    fn with_builtins() -> Self {
        let mut builder = Self {
            types: FxHashMap::default(),
            names: FxHashMap::default(),
        };
        for handle in TypeHandle::BUILTINS {
            builder.insert(builtin_type(handle));
        }
        builder
    }

    fn insert(&mut self, ty: TypeDef) {
        self.names.insert(ty.name.clone(), ty.handle);
        self.types.insert(ty.handle, Arc::new(ty));
    }

    fn lookup(&self, handle: TypeHandle) -> MetaResult<&Arc<TypeDef>> {
        self.types.get(&handle).ok_or(MetaError::UnknownType(handle))
    }

    /// Get a type defined so far
    pub fn get(&self, handle: TypeHandle) -> Option<&Arc<TypeDef>> {
        self.types.get(&handle)
    }

    /// Define a type, returning its handle
    pub fn define(&mut self, def: TypeDefinition) -> MetaResult<TypeHandle> {
        if self.names.contains_key(&def.name) {
            return Err(MetaError::DuplicateType(def.name));
        }
        if !matches!(def.kind, TypeKind::Class | TypeKind::Struct | TypeKind::Interface) {
            return Err(invalid_member(
                &def.name,
                &def.name,
                "only classes, structs and interfaces can be defined",
            ));
        }

        let mut ty = TypeDef::empty(TypeHandle::next(), def.name.clone(), def.kind);
        ty.is_abstract = def.is_abstract;
        ty.is_sealed = def.is_sealed || def.kind == TypeKind::Struct;

        self.inherit(&mut ty, &def)?;
        self.define_fields(&mut ty, &def)?;
        for method in &def.methods {
            let spec = MethodSpec {
                name: method.name.clone(),
                parameters: parameter_infos(&method.parameters),
                return_type: method.return_type,
                visibility: method.visibility,
                is_static: method.is_static,
                dispatch: method.dispatch,
                body: method.body.clone(),
            };
            add_method(&mut ty, spec)?;
        }
        for property in &def.properties {
            add_property(&mut ty, property)?;
        }
        self.bind_interfaces(&mut ty)?;
        define_constructors(&mut ty, &def)?;

        let handle = ty.handle;
        self.insert(ty);
        Ok(handle)
    }

    /// Resolve base and interfaces, then copy everything inherited
    fn inherit(&self, ty: &mut TypeDef, def: &TypeDefinition) -> MetaResult<()> {
        let base = match (def.kind, def.base) {
            (TypeKind::Class, base) => {
                let base = self.lookup(base.unwrap_or(TypeHandle::OBJECT))?;
                if base.kind != TypeKind::Class {
                    return Err(invalid_base(def, base, "base is not a class"));
                }
                if base.is_sealed {
                    return Err(invalid_base(def, base, "base is sealed"));
                }
                Some(Arc::clone(base))
            }
            (_, Some(base)) => {
                let base = self.lookup(base)?;
                let reason = if def.kind == TypeKind::Struct {
                    "structs cannot declare a base type"
                } else {
                    "interfaces extend other interfaces through implements"
                };
                return Err(invalid_base(def, base, reason));
            }
            (_, None) => None,
        };

        for &handle in &def.interfaces {
            let iface = self.lookup(handle)?;
            if !iface.is_interface() {
                return Err(MetaError::NotAnInterface {
                    type_name: def.name.clone(),
                    interface: iface.name.clone(),
                });
            }
            ty.interfaces.push(handle);
            ty.ancestors.extend(iface.ancestors());
            if ty.is_interface() {
                ty.inherited_properties.extend(iface.properties().cloned());
                ty.inherited_methods.extend(iface.methods().cloned());
            }
        }

        if let Some(base) = base {
            ty.base = Some(base.handle);
            ty.ancestors.extend(base.ancestors());
            ty.inherited_fields = base.fields().cloned().collect();
            ty.layout = base.layout.clone();
            ty.field_defaults = base.field_defaults.clone();
            ty.inherited_properties = base.properties().cloned().collect();
            ty.inherited_methods = base.methods().cloned().collect();
            ty.vtable = base.vtable.clone();
        }
        dedup_inherited(ty);
        Ok(())
    }

    fn define_fields(&self, ty: &mut TypeDef, def: &TypeDefinition) -> MetaResult<()> {
        let hidden = def
            .properties
            .iter()
            .filter(|p| p.backing == PropertyBacking::Auto && def.kind != TypeKind::Interface)
            .map(|p| {
                let name = backing_field_name(&p.name);
                (name, p.property_type, Visibility::Private, p.is_static, None)
            });
        let declared = def
            .fields
            .iter()
            .map(|f| {
                let initial = f.initial_value.clone();
                (f.name.clone(), f.field_type, f.visibility, f.is_static, initial)
            });

        for (name, field_type, visibility, is_static, initial) in declared.chain(hidden) {
            if def.kind == TypeKind::Interface {
                return Err(invalid_member(&def.name, &name, "interfaces cannot declare fields"));
            }
            let initial = match initial {
                Some(value) => value.detach(),
                None => Value::zero_of(self.lookup(field_type)?),
            };
            let storage = if is_static {
                FieldStorage::Static(StaticCell::new(initial))
            } else {
                ty.field_defaults.push(initial);
                FieldStorage::Instance(ty.layout.len())
            };
            let field = Arc::new(FieldInfo {
                id: MemberId::next(),
                name,
                declaring_type: ty.handle,
                field_type,
                visibility,
                storage,
            });
            if !field.is_static() {
                ty.layout.push(Arc::clone(&field));
            }
            ty.fields.push(field);
        }
        Ok(())
    }

    /// Bind every interface slot to this type's implementation
    fn bind_interfaces(&self, ty: &mut TypeDef) -> MetaResult<()> {
        if ty.is_interface() {
            return Ok(());
        }
        let interfaces: Vec<Arc<TypeDef>> = ty
            .ancestors
            .iter()
            .filter_map(|h| self.types.get(h))
            .filter(|t| t.is_interface())
            .cloned()
            .collect();

        for iface in interfaces {
            for required in &iface.methods {
                let Some(slot) = required.virtual_slot else {
                    continue;
                };
                let parameter_types = required.parameter_types();
                let implements = |m: &&Arc<MethodInfo>| {
                    !m.is_static
                        && m.body.is_some()
                        && m.matches_signature(&required.name, &parameter_types)
                };

                let declared = ty.methods.iter().find(implements).cloned();
                let candidate = match declared {
                    Some(method) => Some(method),
                    None if ty.vtable.contains_key(&slot) => continue,
                    None => ty.inherited_methods.iter().find(implements).cloned(),
                };
                match candidate {
                    Some(method) => {
                        let resolved = method
                            .virtual_slot
                            .and_then(|s| ty.vtable.get(&s).cloned())
                            .unwrap_or(method);
                        ty.vtable.insert(slot, resolved);
                    }
                    None if ty.is_abstract => {}
                    None => {
                        return Err(MetaError::UnimplementedMember {
                            type_name: ty.name.clone(),
                            interface: iface.name.clone(),
                            member: required.name.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Freeze the registry
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            id: RegistryId::next(),
            types: Arc::new(self.types),
            names: Arc::new(self.names),
        }
    }
}

/// Create a registry containing the built-in types
pub fn create_standard_registry() -> TypeRegistry {
    TypeRegistry::builder().build()
}

fn builtin_type(handle: TypeHandle) -> TypeDef {
    let kind = match handle {
        TypeHandle::VOID => TypeKind::Void,
        TypeHandle::BOOL => TypeKind::Primitive(PrimitiveKind::Bool),
        TypeHandle::INT32 => TypeKind::Primitive(PrimitiveKind::Int32),
        TypeHandle::INT64 => TypeKind::Primitive(PrimitiveKind::Int64),
        TypeHandle::FLOAT64 => TypeKind::Primitive(PrimitiveKind::Float64),
        _ => TypeKind::Class,
    };
    let name = handle.builtin_name().unwrap_or("?").to_string();
    let mut ty = TypeDef::empty(handle, name, kind);
    match handle {
        TypeHandle::OBJECT => ty
            .constructors
            .push(implicit_constructor(handle, Visibility::Public)),
        TypeHandle::STRING => {
            ty.base = Some(TypeHandle::OBJECT);
            ty.is_sealed = true;
        }
        _ => {}
    }
    ty
}

fn implicit_constructor(
    declaring_type: TypeHandle,
    visibility: Visibility,
) -> Arc<ConstructorInfo> {
    Arc::new(ConstructorInfo {
        id: MemberId::next(),
        declaring_type,
        parameters: Vec::new(),
        visibility,
        body: None,
    })
}

fn define_constructors(ty: &mut TypeDef, def: &TypeDefinition) -> MetaResult<()> {
    if def.kind == TypeKind::Interface {
        if !def.constructors.is_empty() {
            return Err(invalid_member(
                &def.name,
                ".ctor",
                "interfaces cannot declare constructors",
            ));
        }
        return Ok(());
    }
    if def.constructors.is_empty() && def.kind == TypeKind::Class {
        let visibility = if def.is_abstract {
            Visibility::Protected
        } else {
            Visibility::Public
        };
        ty.constructors.push(implicit_constructor(ty.handle, visibility));
        return Ok(());
    }
    for ctor in &def.constructors {
        ty.constructors.push(Arc::new(ConstructorInfo {
            id: MemberId::next(),
            declaring_type: ty.handle,
            parameters: parameter_infos(&ctor.parameters),
            visibility: ctor.visibility,
            body: ctor.body.clone(),
        }));
    }
    Ok(())
}

fn add_method(ty: &mut TypeDef, spec: MethodSpec) -> MetaResult<Arc<MethodInfo>> {
    let is_interface = ty.is_interface();
    if is_interface && spec.body.is_some() {
        return Err(invalid_member(&ty.name, &spec.name, "interface members cannot have a body"));
    }
    if spec.is_static && (is_interface || spec.dispatch != Dispatch::Direct) {
        return Err(invalid_member(&ty.name, &spec.name, "static members cannot be virtual"));
    }
    if spec.body.is_none()
        && !is_interface
        && !(ty.is_abstract && spec.dispatch != Dispatch::Direct)
    {
        return Err(invalid_member(
            &ty.name,
            &spec.name,
            "members without a body must be virtual members of an abstract type",
        ));
    }

    let spec_dispatch = spec.dispatch;
    let slot = match (is_interface, spec.dispatch) {
        (true, _) | (false, Dispatch::Virtual) => Some(VirtualSlot::next()),
        (false, Dispatch::Direct) => None,
        (false, Dispatch::Override) => {
            let parameter_types: Vec<TypeHandle> =
                spec.parameters.iter().map(|p| p.parameter_type).collect();
            let slot = ty
                .inherited_methods
                .iter()
                .find(|m| !m.is_static && m.matches_signature(&spec.name, &parameter_types))
                .and_then(|m| m.virtual_slot);
            match slot {
                Some(slot) => Some(slot),
                None => {
                    return Err(MetaError::NothingToOverride {
                        type_name: ty.name.clone(),
                        method: spec.name,
                    })
                }
            }
        }
    };

    let method = Arc::new(MethodInfo {
        id: MemberId::next(),
        name: spec.name,
        declaring_type: ty.handle,
        parameters: spec.parameters,
        return_type: spec.return_type,
        visibility: spec.visibility,
        is_static: spec.is_static,
        virtual_slot: slot,
        body: spec.body,
    });

    if let (Some(slot), Dispatch::Override) = (slot, spec_dispatch) {
        ty.inherited_methods.retain(|m| m.virtual_slot != Some(slot));
    }
    if let (Some(slot), false, true) = (slot, is_interface, method.body.is_some()) {
        // Interface slots bound to the replaced implementation follow the override
        if let Some(previous) = ty.vtable.get(&slot).cloned() {
            for bound in ty.vtable.values_mut() {
                if Arc::ptr_eq(bound, &previous) {
                    *bound = Arc::clone(&method);
                }
            }
        }
        ty.vtable.insert(slot, Arc::clone(&method));
    }
    ty.methods.push(Arc::clone(&method));
    Ok(method)
}

fn add_property(ty: &mut TypeDef, def: &PropertyDefinition) -> MetaResult<()> {
    let storage = match &def.backing {
        PropertyBacking::None => None,
        PropertyBacking::Auto if ty.is_interface() => None,
        PropertyBacking::Auto => ty
            .field(&backing_field_name(&def.name))
            .map(|f| f.storage.clone()),
        PropertyBacking::Field(name) => {
            let field = ty.field(name).ok_or_else(|| MetaError::UnknownBackingField {
                type_name: ty.name.clone(),
                property: def.name.clone(),
                field: name.clone(),
            })?;
            if field.is_static() != def.is_static {
                return Err(invalid_member(
                    &ty.name,
                    &def.name,
                    "backing field and property disagree on being static",
                ));
            }
            Some(field.storage.clone())
        }
    };

    let index_parameters = parameter_infos(&def.index_parameters);
    let getter = match &def.getter {
        Some(accessor) => {
            let body = accessor_body(ty, def, accessor, storage.as_ref().map(field_reader))?;
            let spec = MethodSpec {
                name: format!("get_{}", def.name),
                parameters: index_parameters.clone(),
                return_type: def.property_type,
                visibility: accessor.visibility,
                is_static: def.is_static,
                dispatch: def.dispatch,
                body,
            };
            Some(add_method(ty, spec)?)
        }
        None => None,
    };
    let setter = match &def.setter {
        Some(accessor) => {
            let body = accessor_body(ty, def, accessor, storage.as_ref().map(field_writer))?;
            let mut parameters = index_parameters.clone();
            parameters.push(ParameterInfo {
                name: "value".to_string(),
                parameter_type: def.property_type,
                position: parameters.len(),
            });
            let spec = MethodSpec {
                name: format!("set_{}", def.name),
                parameters,
                return_type: TypeHandle::VOID,
                visibility: accessor.visibility,
                is_static: def.is_static,
                dispatch: def.dispatch,
                body,
            };
            Some(add_method(ty, spec)?)
        }
        None => None,
    };

    ty.inherited_properties.retain(|p| p.name != def.name);
    ty.properties.push(Arc::new(PropertyInfo {
        id: MemberId::next(),
        name: def.name.clone(),
        declaring_type: ty.handle,
        property_type: def.property_type,
        getter,
        setter,
        index_parameters,
    }));
    Ok(())
}

fn accessor_body(
    ty: &TypeDef,
    def: &PropertyDefinition,
    accessor: &AccessorDefinition,
    generated: Option<NativeMethod>,
) -> MetaResult<Option<NativeMethod>> {
    match &accessor.body {
        AccessorBody::Abstract => Ok(None),
        AccessorBody::Generated if ty.is_interface() => Ok(None),
        AccessorBody::Native(body) => Ok(Some(Arc::clone(body))),
        AccessorBody::Generated if !def.index_parameters.is_empty() => Err(invalid_member(
            &ty.name,
            &def.name,
            "indexed properties need native accessors",
        )),
        AccessorBody::Generated => match generated {
            Some(body) => Ok(Some(body)),
            None => Err(invalid_member(
                &ty.name,
                &def.name,
                "generated accessors need a backing field",
            )),
        },
    }
}

fn field_reader(storage: &FieldStorage) -> NativeMethod {
    match storage.clone() {
        FieldStorage::Instance(slot) => native::method(move |inv| inv.this()?.load(slot)),
        FieldStorage::Static(cell) => native::method(move |_| Ok(cell.get())),
    }
}

fn field_writer(storage: &FieldStorage) -> NativeMethod {
    match storage.clone() {
        FieldStorage::Instance(slot) => native::method(move |inv| {
            let value = inv.arg(0)?.clone();
            inv.this()?.store(slot, value)?;
            Ok(Value::Null)
        }),
        FieldStorage::Static(cell) => native::method(move |inv| {
            cell.set(inv.arg(0)?.clone());
            Ok(Value::Null)
        }),
    }
}

/// Drop inherited members hidden by a more derived member with the same name
/// (properties) or slot (methods)
fn dedup_inherited(ty: &mut TypeDef) {
    let mut seen_properties = FxHashSet::default();
    ty.inherited_properties
        .retain(|p| seen_properties.insert(p.name.clone()));

    let mut seen_slots = FxHashSet::default();
    let mut seen_ids = FxHashSet::default();
    ty.inherited_methods.retain(|m| {
        seen_ids.insert(m.id) && m.virtual_slot.is_none_or(|slot| seen_slots.insert(slot))
    });
}

fn backing_field_name(property: &str) -> String {
    format!("<{}>backing", property)
}

fn parameter_infos(parameters: &[ParameterDefinition]) -> Vec<ParameterInfo> {
    parameters
        .iter()
        .enumerate()
        .map(|(position, p)| ParameterInfo {
            name: p.name.clone(),
            parameter_type: p.parameter_type,
            position,
        })
        .collect()
}

fn invalid_base(def: &TypeDefinition, base: &TypeDef, reason: &'static str) -> MetaError {
    MetaError::InvalidBase {
        type_name: def.name.clone(),
        base: base.name.clone(),
        reason,
    }
}

fn invalid_member(type_name: &str, member: &str, reason: &'static str) -> MetaError {
    MetaError::InvalidMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ConstructorDefinition, FieldDefinition, MethodDefinition};
    use crate::native::Invocation;
    use crate::object::Object;

    fn int_body(
        value: i32,
    ) -> impl Fn(&Invocation<'_>) -> Result<Value, crate::RuntimeError> + Send + Sync {
        move |_| Ok(Value::Int32(value))
    }

    #[test]
    fn test_standard_registry() {
        let registry = create_standard_registry();
        assert_eq!(registry.len(), TypeHandle::BUILTINS.len());
        assert!(registry.get(TypeHandle::INT32).unwrap().is_value_type());
        assert!(registry.get(TypeHandle::STRING).unwrap().is_sealed());
        assert!(registry.get(TypeHandle::OBJECT).unwrap().default_constructor().is_some());
        assert_eq!(registry.by_name("Int64").unwrap().handle(), TypeHandle::INT64);
    }

    #[test]
    fn test_registry_identity() {
        let a = create_standard_registry();
        let b = create_standard_registry();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_derived_layout_puts_base_fields_first() {
        let mut builder = TypeRegistry::builder();
        let base = builder
            .define(
                TypeDefinition::class("Base").field(FieldDefinition::new("a", TypeHandle::INT32)),
            )
            .unwrap();
        let derived = builder
            .define(
                TypeDefinition::class("Derived")
                    .extends(base)
                    .field(FieldDefinition::new("b", TypeHandle::STRING)),
            )
            .unwrap();
        let registry = builder.build();
        let derived = registry.get(derived).unwrap();

        assert_eq!(derived.instance_slot("a"), Some(0));
        assert_eq!(derived.instance_slot("b"), Some(1));
        assert_eq!(derived.field("a").unwrap().declaring_type, base);
        assert!(registry.is_assignable_from(base, derived.handle()));
        assert!(!registry.is_assignable_from(derived.handle(), base));
    }

    #[test]
    fn test_override_replaces_vtable_entry() {
        let mut builder = TypeRegistry::builder();
        let base = builder
            .define(
                TypeDefinition::class("Shape").method(
                    MethodDefinition::new("sides")
                        .returns(TypeHandle::INT32)
                        .as_virtual()
                        .body(int_body(0)),
                ),
            )
            .unwrap();
        let square = builder
            .define(
                TypeDefinition::class("Square").extends(base).method(
                    MethodDefinition::new("sides")
                        .returns(TypeHandle::INT32)
                        .as_override()
                        .body(int_body(4)),
                ),
            )
            .unwrap();
        let registry = builder.build();
        let declared = Arc::clone(registry.get(base).unwrap().method("sides").unwrap());
        let square = registry.get(square).unwrap();

        let resolved = square.resolve_virtual(&declared).unwrap();
        assert_eq!(resolved.declaring_type, square.handle());
        let body = resolved.body.as_ref().unwrap();
        assert_eq!(body(&Invocation::new(None, &[])).unwrap(), Value::Int32(4));
        assert_eq!(square.methods().count(), 1);
    }

    #[test]
    fn test_interface_property_binding() {
        let mut builder = TypeRegistry::builder();
        let named = builder
            .define(
                TypeDefinition::interface("Named")
                    .property(PropertyDefinition::auto("name", TypeHandle::STRING)),
            )
            .unwrap();
        let person = builder
            .define(
                TypeDefinition::class("Person")
                    .implements(named)
                    .property(PropertyDefinition::auto("name", TypeHandle::STRING)),
            )
            .unwrap();
        let registry = builder.build();
        let getter = Arc::clone(
            registry
                .get(named)
                .unwrap()
                .property("name")
                .unwrap()
                .getter
                .as_ref()
                .unwrap(),
        );
        assert!(getter.is_abstract());

        let person = registry.get(person).unwrap();
        let instance = Object::zeroed(person);
        instance.set("<name>backing", "Ada");

        let resolved = person.resolve_virtual(&getter).unwrap();
        let body = resolved.body.as_ref().unwrap();
        assert_eq!(body(&Invocation::new(Some(&instance), &[])).unwrap(), Value::from("Ada"));
    }

    #[test]
    fn test_missing_interface_member() {
        let mut builder = TypeRegistry::builder();
        let sized = builder
            .define(
                TypeDefinition::interface("Sized")
                    .method(MethodDefinition::new("size").returns(TypeHandle::INT32)),
            )
            .unwrap();
        let err = builder
            .define(TypeDefinition::class("Empty").implements(sized))
            .unwrap_err();
        assert!(matches!(err, MetaError::UnimplementedMember { .. }));

        assert!(builder
            .define(TypeDefinition::class("Partial").implements(sized).as_abstract())
            .is_ok());
    }

    #[test]
    fn test_definition_errors() {
        let mut builder = TypeRegistry::builder();
        let sealed = builder.define(TypeDefinition::class("Leaf").sealed()).unwrap();

        assert!(matches!(
            builder.define(TypeDefinition::class("Leaf")),
            Err(MetaError::DuplicateType(_))
        ));
        assert!(matches!(
            builder.define(TypeDefinition::class("Child").extends(sealed)),
            Err(MetaError::InvalidBase { .. })
        ));
        assert!(matches!(
            builder.define(TypeDefinition::class("Impl").implements(sealed)),
            Err(MetaError::NotAnInterface { .. })
        ));
        assert!(matches!(
            builder.define(
                TypeDefinition::class("Lonely")
                    .method(MethodDefinition::new("f").as_override().body(int_body(1)))
            ),
            Err(MetaError::NothingToOverride { .. })
        ));
        assert!(matches!(
            builder.define(TypeDefinition::class("Bad").property(PropertyDefinition::backed_by(
                "p",
                TypeHandle::INT32,
                "nope"
            ))),
            Err(MetaError::UnknownBackingField { .. })
        ));
    }

    #[test]
    fn test_constructors() {
        let mut builder = TypeRegistry::builder();
        let plain = builder.define(TypeDefinition::class("Plain")).unwrap();
        let explicit = builder
            .define(
                TypeDefinition::class("Explicit")
                    .constructor(ConstructorDefinition::new().param("x", TypeHandle::INT32)),
            )
            .unwrap();
        let point = builder.define(TypeDefinition::structure("Point")).unwrap();
        let registry = builder.build();

        assert!(registry.get(plain).unwrap().default_constructor().is_some());
        let explicit = registry.get(explicit).unwrap();
        assert!(explicit.default_constructor().is_none());
        assert!(explicit.constructor(&[TypeHandle::INT32]).is_some());
        assert!(registry.get(point).unwrap().constructors().is_empty());
    }

    #[test]
    fn test_static_fields_share_storage() {
        let mut builder = TypeRegistry::builder();
        let handle = builder
            .define(
                TypeDefinition::class("Config")
                    .field(
                        FieldDefinition::new("limit", TypeHandle::INT32)
                            .as_static()
                            .initial_value(10),
                    )
                    .property(
                        PropertyDefinition::backed_by("Limit", TypeHandle::INT32, "limit")
                            .as_static(),
                    ),
            )
            .unwrap();
        let registry = builder.build();
        let config = registry.get(handle).unwrap();

        let FieldStorage::Static(cell) = &config.field("limit").unwrap().storage else {
            panic!("expected static storage");
        };
        let setter = Arc::clone(config.property("Limit").unwrap().setter.as_ref().unwrap());
        let body = setter.body.as_ref().unwrap();
        body(&Invocation::new(None, &[Value::Int32(25)])).unwrap();
        assert_eq!(cell.get(), Value::Int32(25));
        assert!(config.layout().is_empty());
    }
}
