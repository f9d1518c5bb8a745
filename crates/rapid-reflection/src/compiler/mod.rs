//! Accessor compilers, one module per member kind
//!
//! Every public operation follows the same path: reject absent descriptors,
//! check the member shape, then ask the cache for the accessor, emitting a
//! body only on a miss. Typed view checks run on the miss too.

mod constructor;
mod field;
mod member;
mod method;
mod property;

use std::sync::Arc;

use rapid_meta::{TypeDef, TypeHandle};

use crate::emit::{IlBuilder, Op};
use crate::error::AccessorResult;
use crate::reflector::Reflector;

impl Reflector {
    /// Name a compiled body after its member
    pub(crate) fn accessor_name(&self, declaring: TypeHandle, member: &str, verb: &str) -> String {
        match self.registry().get(declaring) {
            Some(t) => format!("{}.{}:{}", t.name(), member, verb),
            None => format!("{}.{}:{}", declaring, member, verb),
        }
    }

    /// Load the receiver and cast it to the declaring type
    ///
    /// A typed owner distinct from the declaring type is checked first.
    pub(crate) fn emit_receiver(
        &self,
        il: &mut IlBuilder,
        declaring: TypeHandle,
        owner: Option<TypeHandle>,
        param: &'static str,
    ) -> AccessorResult<()> {
        il.emit(Op::LoadReceiver)?;
        if let Some(owner) = owner.filter(|&owner| owner != declaring) {
            il.emit_cast_reference(&self.type_def(owner, param)?)?;
        }
        il.emit_cast_reference(&self.type_def(declaring, param)?)
    }

    /// Coerce the setter input to the member type and park it in a local
    pub(crate) fn emit_input(
        &self,
        il: &mut IlBuilder,
        member_type: &Arc<TypeDef>,
        value: Option<TypeHandle>,
        param: &'static str,
    ) -> AccessorResult<usize> {
        il.emit(Op::LoadInput)?;
        if let Some(value) = value.filter(|&value| value != member_type.handle()) {
            il.emit_cast_value(&self.type_def(value, param)?)?;
        }
        il.emit_cast_value(member_type)?;
        let local = il.declare_local();
        il.emit(Op::StoreLocal(local))?;
        Ok(local)
    }

    /// Load each declared argument coerced to its parameter type
    pub(crate) fn emit_arguments(
        &self,
        il: &mut IlBuilder,
        parameter_types: impl IntoIterator<Item = TypeHandle>,
        param: &'static str,
    ) -> AccessorResult<usize> {
        let mut count = 0;
        for (index, parameter_type) in parameter_types.into_iter().enumerate() {
            il.emit(Op::LoadArgument(index))?;
            il.emit_cast_value(&self.type_def(parameter_type, param)?)?;
            count += 1;
        }
        Ok(count)
    }
}
