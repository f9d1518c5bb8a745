//! Constructor factories

use std::sync::Arc;

use rapid_meta::{ConstructorInfo, TypeDef};

use crate::accessor::{DefaultFactory, Factory};
use crate::cache::{AccessorKind, CacheKey};
use crate::emit::{DynamicMethod, IlBuilder, Op};
use crate::error::{AccessorError, AccessorResult};
use crate::options::CompilationOptions;
use crate::reflector::Reflector;
use crate::validate::{emit_guards, Guards};

const TYPE_PARAM: &str = "type";
const CTOR_PARAM: &str = "constructor";

impl Reflector {
    /// Compile a factory producing a default instance of a type
    ///
    /// Value types yield their zero value. Classes need a public
    /// parameterless constructor; interfaces and abstract types are rejected.
    pub fn type_factory(&self, type_def: Option<&Arc<TypeDef>>) -> AccessorResult<DefaultFactory> {
        let type_def = type_def.ok_or(AccessorError::NullArgument { param: TYPE_PARAM })?;
        if type_def.is_interface() {
            return Err(AccessorError::shape("The type is an interface.", TYPE_PARAM));
        }
        if type_def.is_abstract() {
            return Err(AccessorError::shape("The type is abstract.", TYPE_PARAM));
        }
        if !type_def.is_value_type() && type_def.default_constructor().is_none() {
            return Err(AccessorError::shape(
                "The type does not have a public parameterless constructor.",
                TYPE_PARAM,
            ));
        }

        let key = CacheKey::for_type(
            self.registry().id(),
            type_def.handle(),
            AccessorKind::DefaultFactory,
        );
        self.cache().get_or_compile(key, type_def.name(), || {
            Ok(DefaultFactory::new(self.compile_default_factory(type_def)?))
        })
    }

    /// Compile a factory for a specific constructor
    ///
    /// Arguments are coerced positionally; trailing extras are ignored.
    pub fn ctor_factory(
        &self,
        constructor: Option<&Arc<ConstructorInfo>>,
        validate_arguments: bool,
    ) -> AccessorResult<Factory> {
        let constructor = constructor.ok_or(AccessorError::NullArgument { param: CTOR_PARAM })?;
        let declaring = self.type_def(constructor.declaring_type, CTOR_PARAM)?;
        if declaring.is_abstract() {
            return Err(AccessorError::shape(
                "The declaring type of the constructor is abstract.",
                CTOR_PARAM,
            ));
        }

        let options = CompilationOptions::default().validate_arguments(validate_arguments);
        let key = CacheKey::member(
            self.registry().id(),
            constructor.id,
            AccessorKind::ConstructorFactory,
            options,
        );
        self.cache().get_or_compile(key, declaring.name(), || {
            Ok(Factory::new(self.compile_ctor_factory(
                constructor,
                &declaring,
                validate_arguments,
            )?))
        })
    }

    /// [`ctor_factory`](Self::ctor_factory) with the reflector defaults
    pub fn ctor_factory_default(
        &self,
        constructor: Option<&Arc<ConstructorInfo>>,
    ) -> AccessorResult<Factory> {
        self.ctor_factory(constructor, self.defaults().validate_arguments)
    }

    fn compile_default_factory(&self, type_def: &Arc<TypeDef>) -> AccessorResult<DynamicMethod> {
        let mut il = IlBuilder::new(self.accessor_name(type_def.handle(), ".ctor", "default"));

        if type_def.is_value_type() {
            il.emit(Op::InitObject(Arc::clone(type_def)))?;
            il.emit_box_if_needed(type_def)?;
        } else {
            let body = type_def.default_constructor().and_then(|ctor| ctor.body.clone());
            il.emit(Op::NewObject {
                type_def: Arc::clone(type_def),
                arity: 0,
                body,
            })?;
        }
        il.emit(Op::Return)?;
        il.build()
    }

    fn compile_ctor_factory(
        &self,
        constructor: &ConstructorInfo,
        declaring: &Arc<TypeDef>,
        validate_arguments: bool,
    ) -> AccessorResult<DynamicMethod> {
        let mut il = IlBuilder::new(self.accessor_name(declaring.handle(), ".ctor", "new"));

        if validate_arguments {
            emit_guards(
                &mut il,
                Guards {
                    receiver: false,
                    parameter_count: constructor.parameters.len(),
                },
            )?;
        }

        let arity = self.emit_arguments(
            &mut il,
            constructor.parameters.iter().map(|p| p.parameter_type),
            CTOR_PARAM,
        )?;
        il.emit(Op::NewObject {
            type_def: Arc::clone(declaring),
            arity,
            body: constructor.body.clone(),
        })?;
        il.emit(Op::Return)?;
        il.build()
    }
}
