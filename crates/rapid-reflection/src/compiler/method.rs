//! Method invokers

use std::sync::Arc;

use rapid_meta::MethodInfo;

use crate::accessor::Invoker;
use crate::cache::{AccessorKind, CacheKey};
use crate::emit::{DynamicMethod, IlBuilder, Op};
use crate::error::{AccessorError, AccessorResult};
use crate::options::CompilationOptions;
use crate::reflector::Reflector;
use crate::validate::{emit_guards, Guards};

const PARAM: &str = "method";

impl Reflector {
    /// Compile a uniform invoker for a method
    ///
    /// Virtual and interface methods dispatch on the receiver's run-time
    /// type. Void methods return null. With `validate_arguments` off, a null
    /// receiver or a short argument array faults inside the body.
    pub fn method_invoker(
        &self,
        method: Option<&Arc<MethodInfo>>,
        validate_arguments: bool,
    ) -> AccessorResult<Invoker> {
        let method = method.ok_or(AccessorError::NullArgument { param: PARAM })?;
        let options = CompilationOptions::default().validate_arguments(validate_arguments);
        let key = CacheKey::member(
            self.registry().id(),
            method.id,
            AccessorKind::MethodInvoker,
            options,
        );

        self.cache().get_or_compile(key, &method.name, || {
            Ok(Invoker::new(self.compile_invoker(method, validate_arguments)?))
        })
    }

    /// [`method_invoker`](Self::method_invoker) with the reflector defaults
    pub fn method_invoker_default(
        &self,
        method: Option<&Arc<MethodInfo>>,
    ) -> AccessorResult<Invoker> {
        self.method_invoker(method, self.defaults().validate_arguments)
    }

    fn compile_invoker(
        &self,
        method: &Arc<MethodInfo>,
        validate_arguments: bool,
    ) -> AccessorResult<DynamicMethod> {
        let name = self.accessor_name(method.declaring_type, &method.name, "invoke");
        let mut il = IlBuilder::new(name);

        if validate_arguments {
            emit_guards(
                &mut il,
                Guards {
                    receiver: !method.is_static,
                    parameter_count: method.parameters.len(),
                },
            )?;
        }

        if !method.is_static {
            self.emit_receiver(&mut il, method.declaring_type, None, PARAM)?;
        }
        self.emit_arguments(&mut il, method.parameters.iter().map(|p| p.parameter_type), PARAM)?;
        il.emit_call_method(method)?;

        if method.returns_void() {
            il.emit(Op::LoadNull)?;
        } else {
            il.emit_box_if_needed(&*self.type_def(method.return_type, PARAM)?)?;
        }
        il.emit(Op::Return)?;
        il.build()
    }
}
