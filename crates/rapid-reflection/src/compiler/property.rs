//! Property getters and setters
//!
//! Properties compile to a call of their resolved accessor method, so
//! interface and virtual properties dispatch on the receiver's run-time type.

use std::sync::Arc;

use rapid_meta::{MethodInfo, PropertyInfo, TypeHandle};

use crate::accessor::{Getter, Setter};
use crate::cache::{AccessorKind, CacheKey};
use crate::emit::{DynamicMethod, IlBuilder, Op};
use crate::error::{AccessorError, AccessorResult};
use crate::options::CompilationOptions;
use crate::reflector::Reflector;
use crate::typed::{check_view, Access, MemberShape, TypedGetter, TypedSetter, TypedView};

const PARAM: &str = "property";

fn require(property: Option<&Arc<PropertyInfo>>) -> AccessorResult<&Arc<PropertyInfo>> {
    property.ok_or(AccessorError::NullArgument { param: PARAM })
}

fn shape(property: &PropertyInfo) -> MemberShape {
    MemberShape {
        declaring_type: property.declaring_type,
        member_type: property.property_type,
        is_static: property.is_static(),
    }
}

fn key(
    reflector: &Reflector,
    property: &PropertyInfo,
    kind: AccessorKind,
    include_non_public: bool,
) -> CacheKey {
    let options = CompilationOptions::default().include_non_public(include_non_public);
    CacheKey::member(reflector.registry().id(), property.id, kind, options)
}

fn resolve_get(
    property: &PropertyInfo,
    include_non_public: bool,
) -> AccessorResult<&Arc<MethodInfo>> {
    if property.is_indexed() {
        return Err(AccessorError::shape(
            "Cannot create a dynamic getter for an indexed property.",
            PARAM,
        ));
    }
    match (property.get_method(include_non_public), &property.getter) {
        (Some(method), _) => Ok(method),
        (None, None) => Err(AccessorError::shape(
            "The property does not have a get method.",
            PARAM,
        )),
        (None, Some(_)) => Err(AccessorError::shape(
            "The property does not have a public get method.",
            PARAM,
        )),
    }
}

fn resolve_set(
    property: &PropertyInfo,
    include_non_public: bool,
) -> AccessorResult<&Arc<MethodInfo>> {
    if property.is_indexed() {
        return Err(AccessorError::shape(
            "Cannot create a dynamic setter for an indexed property.",
            PARAM,
        ));
    }
    match (property.set_method(include_non_public), &property.setter) {
        (Some(method), _) => Ok(method),
        (None, None) => Err(AccessorError::shape(
            "The property does not have a set method.",
            PARAM,
        )),
        (None, Some(_)) => Err(AccessorError::shape(
            "The property does not have a public set method.",
            PARAM,
        )),
    }
}

impl Reflector {
    /// Compile a getter for a property
    ///
    /// Fails if the property is indexed or has no get accessor visible under
    /// `include_non_public`.
    pub fn property_getter(
        &self,
        property: Option<&Arc<PropertyInfo>>,
        include_non_public: bool,
    ) -> AccessorResult<Getter> {
        let property = require(property)?;
        let method = resolve_get(property, include_non_public)?;

        let key = key(self, property, AccessorKind::PropertyGetter, include_non_public);
        self.cache().get_or_compile(key, &property.name, || {
            Ok(Getter::new(self.compile_property_getter(property, method, None)?))
        })
    }

    /// [`property_getter`](Self::property_getter) with the reflector defaults
    pub fn property_getter_default(
        &self,
        property: Option<&Arc<PropertyInfo>>,
    ) -> AccessorResult<Getter> {
        self.property_getter(property, self.defaults().include_non_public)
    }

    /// Compile a setter for a property
    ///
    /// The value is coerced to the property type before the set accessor
    /// runs.
    pub fn property_setter(
        &self,
        property: Option<&Arc<PropertyInfo>>,
        include_non_public: bool,
    ) -> AccessorResult<Setter> {
        let property = require(property)?;
        let method = resolve_set(property, include_non_public)?;

        let key = key(self, property, AccessorKind::PropertySetter, include_non_public);
        self.cache().get_or_compile(key, &property.name, || {
            Ok(Setter::new(self.compile_property_setter(property, method, None)?))
        })
    }

    /// [`property_setter`](Self::property_setter) with the reflector defaults
    pub fn property_setter_default(
        &self,
        property: Option<&Arc<PropertyInfo>>,
    ) -> AccessorResult<Setter> {
        self.property_setter(property, self.defaults().include_non_public)
    }

    /// Compile a getter for a fixed `(owner, value)` view of a property
    pub fn typed_property_getter(
        &self,
        property: Option<&Arc<PropertyInfo>>,
        owner: TypeHandle,
        value: TypeHandle,
        include_non_public: bool,
    ) -> AccessorResult<TypedGetter> {
        let property = require(property)?;
        let method = resolve_get(property, include_non_public)?;
        let view = TypedView::new(owner, value);

        let key =
            key(self, property, AccessorKind::PropertyGetter, include_non_public).with_view(view);
        self.cache().get_or_compile(key, &property.name, || {
            check_view(self.registry(), shape(property), view, Access::Read, PARAM)?;
            let getter = Getter::new(self.compile_property_getter(property, method, Some(view))?);
            Ok(TypedGetter::new(getter, view))
        })
    }

    /// Compile a setter for a fixed `(owner, value)` view of a property
    pub fn typed_property_setter(
        &self,
        property: Option<&Arc<PropertyInfo>>,
        owner: TypeHandle,
        value: TypeHandle,
        include_non_public: bool,
    ) -> AccessorResult<TypedSetter> {
        let property = require(property)?;
        let method = resolve_set(property, include_non_public)?;
        let view = TypedView::new(owner, value);

        let key =
            key(self, property, AccessorKind::PropertySetter, include_non_public).with_view(view);
        self.cache().get_or_compile(key, &property.name, || {
            check_view(self.registry(), shape(property), view, Access::Write, PARAM)?;
            let setter = Setter::new(self.compile_property_setter(property, method, Some(view))?);
            Ok(TypedSetter::new(setter, view))
        })
    }

    fn compile_property_getter(
        &self,
        property: &PropertyInfo,
        method: &Arc<MethodInfo>,
        view: Option<TypedView>,
    ) -> AccessorResult<DynamicMethod> {
        let property_type = self.type_def(property.property_type, PARAM)?;
        let name = self.accessor_name(property.declaring_type, &property.name, "get");
        let mut il = IlBuilder::new(name);

        if !method.is_static {
            self.emit_receiver(&mut il, method.declaring_type, view.map(|v| v.owner), PARAM)?;
        }
        il.emit_call_method(method)?;
        il.emit_box_if_needed(&property_type)?;
        il.emit(Op::Return)?;
        il.build()
    }

    fn compile_property_setter(
        &self,
        property: &PropertyInfo,
        method: &Arc<MethodInfo>,
        view: Option<TypedView>,
    ) -> AccessorResult<DynamicMethod> {
        let property_type = self.type_def(property.property_type, PARAM)?;
        let name = self.accessor_name(property.declaring_type, &property.name, "set");
        let mut il = IlBuilder::new(name);
        let value = self.emit_input(&mut il, &property_type, view.map(|v| v.value), PARAM)?;

        if !method.is_static {
            self.emit_receiver(&mut il, method.declaring_type, view.map(|v| v.owner), PARAM)?;
        }
        il.emit(Op::LoadLocal(value))?;
        il.emit_call_method(method)?;
        il.emit(Op::ReturnVoid)?;
        il.build()
    }
}
