//! Field getters and setters

use std::sync::Arc;

use rapid_meta::{FieldInfo, FieldStorage, TypeHandle};

use crate::accessor::{Getter, Setter};
use crate::cache::{AccessorKind, CacheKey};
use crate::emit::{DynamicMethod, IlBuilder, Op};
use crate::error::{AccessorError, AccessorResult};
use crate::options::CompilationOptions;
use crate::reflector::Reflector;
use crate::typed::{check_view, Access, MemberShape, TypedGetter, TypedSetter, TypedView};

const PARAM: &str = "field";

fn require(field: Option<&Arc<FieldInfo>>) -> AccessorResult<&Arc<FieldInfo>> {
    field.ok_or(AccessorError::NullArgument { param: PARAM })
}

fn shape(field: &FieldInfo) -> MemberShape {
    MemberShape {
        declaring_type: field.declaring_type,
        member_type: field.field_type,
        is_static: field.is_static(),
    }
}

fn key(reflector: &Reflector, field: &FieldInfo, kind: AccessorKind) -> CacheKey {
    CacheKey::member(reflector.registry().id(), field.id, kind, CompilationOptions::default())
}

impl Reflector {
    /// Compile a getter for a field
    ///
    /// Static fields ignore the receiver. Value-type results are boxed.
    pub fn field_getter(&self, field: Option<&Arc<FieldInfo>>) -> AccessorResult<Getter> {
        let field = require(field)?;
        self.cache()
            .get_or_compile(key(self, field, AccessorKind::FieldGetter), &field.name, || {
                Ok(Getter::new(self.compile_field_getter(field, None)?))
            })
    }

    /// Compile a setter for a field
    ///
    /// The value is coerced to the field type before it is stored.
    pub fn field_setter(&self, field: Option<&Arc<FieldInfo>>) -> AccessorResult<Setter> {
        let field = require(field)?;
        self.cache()
            .get_or_compile(key(self, field, AccessorKind::FieldSetter), &field.name, || {
                Ok(Setter::new(self.compile_field_setter(field, None)?))
            })
    }

    /// Compile a getter for a fixed `(owner, value)` view of a field
    pub fn typed_field_getter(
        &self,
        field: Option<&Arc<FieldInfo>>,
        owner: TypeHandle,
        value: TypeHandle,
    ) -> AccessorResult<TypedGetter> {
        let field = require(field)?;
        let view = TypedView::new(owner, value);

        let key = key(self, field, AccessorKind::FieldGetter).with_view(view);
        self.cache().get_or_compile(key, &field.name, || {
            check_view(self.registry(), shape(field), view, Access::Read, PARAM)?;
            let getter = Getter::new(self.compile_field_getter(field, Some(view))?);
            Ok(TypedGetter::new(getter, view))
        })
    }

    /// Compile a setter for a fixed `(owner, value)` view of a field
    pub fn typed_field_setter(
        &self,
        field: Option<&Arc<FieldInfo>>,
        owner: TypeHandle,
        value: TypeHandle,
    ) -> AccessorResult<TypedSetter> {
        let field = require(field)?;
        let view = TypedView::new(owner, value);

        let key = key(self, field, AccessorKind::FieldSetter).with_view(view);
        self.cache().get_or_compile(key, &field.name, || {
            check_view(self.registry(), shape(field), view, Access::Write, PARAM)?;
            let setter = Setter::new(self.compile_field_setter(field, Some(view))?);
            Ok(TypedSetter::new(setter, view))
        })
    }

    fn compile_field_getter(
        &self,
        field: &FieldInfo,
        view: Option<TypedView>,
    ) -> AccessorResult<DynamicMethod> {
        let field_type = self.type_def(field.field_type, PARAM)?;
        let mut il = IlBuilder::new(self.accessor_name(field.declaring_type, &field.name, "get"));

        match &field.storage {
            FieldStorage::Static(cell) => il.emit(Op::LoadStaticField(cell.clone()))?,
            FieldStorage::Instance(slot) => {
                self.emit_receiver(&mut il, field.declaring_type, view.map(|v| v.owner), PARAM)?;
                il.emit(Op::LoadField(*slot))?;
            }
        }
        il.emit_box_if_needed(&field_type)?;
        il.emit(Op::Return)?;
        il.build()
    }

    fn compile_field_setter(
        &self,
        field: &FieldInfo,
        view: Option<TypedView>,
    ) -> AccessorResult<DynamicMethod> {
        let field_type = self.type_def(field.field_type, PARAM)?;
        let mut il = IlBuilder::new(self.accessor_name(field.declaring_type, &field.name, "set"));
        let value = self.emit_input(&mut il, &field_type, view.map(|v| v.value), PARAM)?;

        match &field.storage {
            FieldStorage::Static(cell) => {
                il.emit(Op::LoadLocal(value))?;
                il.emit(Op::StoreStaticField(cell.clone()))?;
            }
            FieldStorage::Instance(slot) => {
                self.emit_receiver(&mut il, field.declaring_type, view.map(|v| v.owner), PARAM)?;
                il.emit(Op::LoadLocal(value))?;
                il.emit(Op::StoreField(*slot))?;
            }
        }
        il.emit(Op::ReturnVoid)?;
        il.build()
    }
}
