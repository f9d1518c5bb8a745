//! Argument validation emitted at the start of invokers and factories
//!
//! With validation on, an absent receiver or argument array and a short
//! argument array become declared errors. With it off the body faults when
//! it first touches the missing input.

use crate::emit::{IlBuilder, Op};
use crate::error::AccessorResult;

/// Checks to emit for one accessor body
#[derive(Debug, Clone, Copy)]
pub(crate) struct Guards {
    /// Require a non-null receiver
    pub receiver: bool,
    /// Declared parameter count; zero skips the argument checks
    pub parameter_count: usize,
}

impl Guards {
    pub(crate) fn is_empty(&self) -> bool {
        !self.receiver && self.parameter_count == 0
    }
}

/// Emit the guard preamble
pub(crate) fn emit_guards(il: &mut IlBuilder, guards: Guards) -> AccessorResult<()> {
    if guards.is_empty() {
        return Ok(());
    }
    let done = il.define_label();

    if guards.receiver {
        let receiver_present = il.define_label();
        il.emit(Op::LoadReceiver)?;
        il.emit(Op::BranchIfNotNull(receiver_present))?;
        il.emit(Op::ThrowArgumentNull("receiver"))?;
        il.mark_label(receiver_present)?;
    }

    if guards.parameter_count > 0 {
        let arguments_present = il.define_label();
        il.emit(Op::BranchIfArgumentsPresent(arguments_present))?;
        il.emit(Op::ThrowArgumentNull("arguments"))?;
        il.mark_label(arguments_present)?;

        let required = i32::try_from(guards.parameter_count).unwrap_or(i32::MAX);
        il.emit(Op::LoadArgumentCount)?;
        il.emit(Op::LoadInt32(required))?;
        il.emit(Op::BranchIfGreaterOrEqual(done))?;
        il.emit(Op::ThrowNotEnoughArguments {
            param: "arguments",
            required: guards.parameter_count,
        })?;
    } else {
        il.emit(Op::Branch(done))?;
    }

    il.mark_label(done)
}
