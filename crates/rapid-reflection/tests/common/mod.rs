//! Shared fixture types for the accessor integration tests
//!
//! Every call to [`fixtures`] builds a fresh registry with its own static
//! storage and a private accessor cache, so tests never observe each other.

#![allow(dead_code)]

use std::sync::Arc;

use rapid_meta::{
    ConstructorDefinition, ConstructorInfo, FieldDefinition, FieldInfo, MethodDefinition,
    MethodInfo, Object, ObjectRef, PropertyDefinition, PropertyInfo, TypeDef, TypeDefinition,
    TypeHandle, TypeRegistry, Value, Visibility,
};
use rapid_reflection::{CacheMode, Reflector, ReflectorOptions};

pub struct Fixtures {
    pub reflector: Reflector,
    pub iface: TypeHandle,
    pub iface2: TypeHandle,
    pub class: TypeHandle,
    pub class2: TypeHandle,
    pub structure: TypeHandle,
    pub inner: TypeHandle,
    pub inner_derived: TypeHandle,
    pub abstract_class: TypeHandle,
    pub no_default: TypeHandle,
    pub point: TypeHandle,
    pub holder: TypeHandle,
}

/// Members shared by `InternalClass` and `InternalStruct`
fn internal_members(def: TypeDefinition, no_setter_value: i32) -> TypeDefinition {
    def.field(FieldDefinition::new("_intField", TypeHandle::INT32).private())
        .field(FieldDefinition::new("_stringField", TypeHandle::STRING).private())
        .field(FieldDefinition::new("_g", TypeHandle::INT32).private())
        .field(FieldDefinition::new("_s", TypeHandle::INT32).private())
        .field(FieldDefinition::new("StaticField", TypeHandle::INT32).as_static())
        .property(PropertyDefinition::backed_by("PublicProp", TypeHandle::INT32, "_intField"))
        .property(PropertyDefinition::backed_by("StringProp", TypeHandle::STRING, "_stringField"))
        .property(
            PropertyDefinition::new("PropWithNoSetter", TypeHandle::INT32)
                .getter(move |_| Ok(Value::Int32(no_setter_value))),
        )
        .property(PropertyDefinition::new("PropWithNoGetter", TypeHandle::INT32).setter(|_| Ok(())))
        .property(
            PropertyDefinition::backed_by("PropWithPrivateGetter", TypeHandle::INT32, "_g")
                .getter_visibility(Visibility::Private),
        )
        .property(
            PropertyDefinition::backed_by("PropWithPrivateSetter", TypeHandle::INT32, "_s")
                .setter_visibility(Visibility::Private),
        )
        .property(PropertyDefinition::auto("StaticProp", TypeHandle::INT32).as_static())
}

pub fn fixtures() -> Fixtures {
    let mut builder = TypeRegistry::builder();

    let iface = builder
        .define(
            TypeDefinition::interface("IInternalInterface")
                .property(
                    PropertyDefinition::new("PropWithNoSetter", TypeHandle::INT32)
                        .abstract_getter(),
                )
                .property(
                    PropertyDefinition::new("PropWithNoGetter", TypeHandle::INT32)
                        .abstract_setter(),
                )
                .property(PropertyDefinition::auto("PublicProp", TypeHandle::INT32))
                .property(PropertyDefinition::auto("StringProp", TypeHandle::STRING)),
        )
        .unwrap();

    let iface2 = builder
        .define(
            TypeDefinition::interface("IInternalInterface2")
                .implements(iface)
                .property(PropertyDefinition::auto("PublicProp2", TypeHandle::INT32)),
        )
        .unwrap();

    let class = builder
        .define(internal_members(TypeDefinition::class("InternalClass").implements(iface), 1112))
        .unwrap();

    let class2 = builder
        .define(
            TypeDefinition::class("InternalClass2")
                .extends(class)
                .implements(iface2)
                .property(PropertyDefinition::auto("PublicProp2", TypeHandle::INT32)),
        )
        .unwrap();

    let structure = builder
        .define(
            internal_members(TypeDefinition::structure("InternalStruct").implements(iface2), 112)
                .property(PropertyDefinition::auto("PublicProp2", TypeHandle::INT32)),
        )
        .unwrap();

    let inner = builder
        .define(
            TypeDefinition::class("InnerClass")
                .field(FieldDefinition::new("Value", TypeHandle::INT32))
                .method(
                    MethodDefinition::new("Act")
                        .param("value", TypeHandle::INT32)
                        .as_virtual()
                        .body(|inv| {
                            inv.this()?.set("Value", inv.arg_as::<i32>(0)?);
                            Ok(Value::Null)
                        }),
                )
                .method(
                    MethodDefinition::new("IntFunc")
                        .returns(TypeHandle::INT32)
                        .as_virtual()
                        .protected()
                        .body(|_| Ok(Value::Int32(1))),
                )
                .method(
                    MethodDefinition::new("StrFunc")
                        .returns(TypeHandle::STRING)
                        .private()
                        .body(|_| Ok(Value::string(""))),
                )
                .method(
                    MethodDefinition::new("StaticFunc")
                        .param("x", TypeHandle::INT32)
                        .param("y", TypeHandle::INT32)
                        .returns(TypeHandle::INT32)
                        .as_static()
                        .body(|inv| {
                            Ok(Value::Int32(inv.arg_as::<i32>(0)? + inv.arg_as::<i32>(1)?))
                        }),
                ),
        )
        .unwrap();

    let inner_derived = builder
        .define(
            TypeDefinition::class("InnerClassDerived")
                .extends(inner)
                .method(
                    MethodDefinition::new("Act")
                        .param("value", TypeHandle::INT32)
                        .as_override()
                        .body(|inv| {
                            inv.this()?.set("Value", -inv.arg_as::<i32>(0)?);
                            Ok(Value::Null)
                        }),
                )
                .method(
                    MethodDefinition::new("IntFunc")
                        .returns(TypeHandle::INT32)
                        .as_override()
                        .protected()
                        .body(|_| Ok(Value::Int32(2))),
                ),
        )
        .unwrap();

    let abstract_class = builder
        .define(
            TypeDefinition::class("AbstractClass")
                .as_abstract()
                .constructor(ConstructorDefinition::new().param("i", TypeHandle::INT32)),
        )
        .unwrap();

    let no_default = builder
        .define(
            TypeDefinition::class("InternalClassWithNoParameterlessConstructor")
                .field(FieldDefinition::new("i", TypeHandle::INT32))
                .field(FieldDefinition::new("s", TypeHandle::STRING))
                .field(FieldDefinition::new("d", TypeHandle::FLOAT64))
                .constructor(
                    ConstructorDefinition::new()
                        .param("i", TypeHandle::INT32)
                        .body(|inv| {
                            inv.this()?.set("i", inv.arg_as::<i32>(0)?);
                            Ok(())
                        }),
                )
                .constructor(
                    ConstructorDefinition::new()
                        .param("i", TypeHandle::INT32)
                        .param("s", TypeHandle::STRING)
                        .body(|inv| {
                            let this = inv.this()?;
                            this.set("i", inv.arg_as::<i32>(0)?);
                            this.set("s", inv.arg(1)?.clone());
                            Ok(())
                        }),
                )
                .constructor(
                    ConstructorDefinition::new()
                        .param("i", TypeHandle::INT32)
                        .param("s", TypeHandle::STRING)
                        .param("d", TypeHandle::FLOAT64)
                        .body(|inv| {
                            let this = inv.this()?;
                            this.set("i", inv.arg_as::<i32>(0)?);
                            this.set("s", inv.arg(1)?.clone());
                            this.set("d", inv.arg_as::<f64>(2)?);
                            Ok(())
                        }),
                ),
        )
        .unwrap();

    let point = builder
        .define(
            TypeDefinition::structure("Point").field(FieldDefinition::new("X", TypeHandle::INT32)),
        )
        .unwrap();

    let holder = builder
        .define(
            TypeDefinition::class("Holder")
                .field(FieldDefinition::new("Location", point))
                .property(PropertyDefinition::auto("Anchor", point))
                .method(
                    MethodDefinition::new("Echo")
                        .param("value", TypeHandle::OBJECT)
                        .returns(TypeHandle::OBJECT)
                        .as_static()
                        .body(|inv| Ok(inv.arg(0)?.clone())),
                )
                .method(
                    MethodDefinition::new("Nudge")
                        .param("p", point)
                        .returns(TypeHandle::INT32)
                        .as_static()
                        .body(|inv| {
                            let p = inv.arg_as::<ObjectRef>(0)?;
                            p.set("X", 99);
                            Ok(p.get("X").unwrap_or_default())
                        }),
                ),
        )
        .unwrap();

    let options = ReflectorOptions {
        cache: CacheMode::private(),
        ..Default::default()
    };
    Fixtures {
        reflector: Reflector::with_options(builder.build(), options),
        iface,
        iface2,
        class,
        class2,
        structure,
        inner,
        inner_derived,
        abstract_class,
        no_default,
        point,
        holder,
    }
}

impl Fixtures {
    pub fn type_def(&self, handle: TypeHandle) -> Arc<TypeDef> {
        self.reflector.registry().get(handle).cloned().unwrap()
    }

    pub fn field(&self, handle: TypeHandle, name: &str) -> Option<Arc<FieldInfo>> {
        self.type_def(handle).field(name).cloned()
    }

    pub fn property(&self, handle: TypeHandle, name: &str) -> Option<Arc<PropertyInfo>> {
        self.type_def(handle).property(name).cloned()
    }

    pub fn method(&self, handle: TypeHandle, name: &str) -> Option<Arc<MethodInfo>> {
        self.type_def(handle).method(name).cloned()
    }

    pub fn constructor(
        &self,
        handle: TypeHandle,
        parameter_types: &[TypeHandle],
    ) -> Option<Arc<ConstructorInfo>> {
        self.type_def(handle).constructor(parameter_types).cloned()
    }

    /// A zeroed instance; structs come back boxed
    pub fn instance(&self, handle: TypeHandle) -> Value {
        Value::Object(Object::zeroed(&self.type_def(handle)))
    }
}

/// A boxed `Point` with the given `X`
pub fn point(fx: &Fixtures, x: i32) -> Value {
    let boxed = fx.instance(fx.point);
    write(&boxed, "X", x);
    boxed
}

/// Read a field of an instance by name
pub fn read(instance: &Value, name: &str) -> Value {
    instance.as_object().and_then(|obj| obj.get(name)).unwrap()
}

/// Write a field of an instance by name
pub fn write(instance: &Value, name: &str, value: impl Into<Value>) {
    assert!(instance.as_object().unwrap().set(name, value));
}
