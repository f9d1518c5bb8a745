//! Execution of compiled accessor bodies

use std::fmt;
use std::sync::Arc;

use rapid_meta::{Invocation, ObjectRef, RuntimeError, Value};

use super::opcode::{Label, Op};
use crate::coerce;
use crate::error::{AccessorError, AccessorResult};

static NULL_VALUE: Value = Value::Null;

/// Inputs to one accessor call
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Receiver, null for static members and factories
    pub receiver: &'a Value,
    /// Value being written by a setter
    pub input: &'a Value,
    /// Argument array, `None` when absent
    pub arguments: Option<&'a [Value]>,
}

impl<'a> Frame<'a> {
    /// Frame for a getter call
    pub fn getter(receiver: &'a Value) -> Self {
        Self {
            receiver,
            input: &NULL_VALUE,
            arguments: None,
        }
    }

    /// Frame for a setter call
    pub fn setter(receiver: &'a Value, input: &'a Value) -> Self {
        Self {
            receiver,
            input,
            arguments: None,
        }
    }

    /// Frame for an invoker call
    pub fn invoker(receiver: &'a Value, arguments: Option<&'a [Value]>) -> Self {
        Self {
            receiver,
            input: &NULL_VALUE,
            arguments,
        }
    }

    /// Frame for a factory call
    pub fn factory(arguments: Option<&'a [Value]>) -> Self {
        Self::invoker(&NULL_VALUE, arguments)
    }
}

/// A compiled accessor body ready for execution
///
/// Immutable after build; safe to run from many threads at once.
pub struct DynamicMethod {
    name: String,
    code: Vec<Op>,
    /// Label ID -> instruction index
    labels: Vec<usize>,
    local_count: usize,
    max_stack: usize,
}

impl DynamicMethod {
    pub(crate) fn new(
        name: String,
        code: Vec<Op>,
        labels: Vec<usize>,
        local_count: usize,
        max_stack: usize,
    ) -> Self {
        Self {
            name,
            code,
            labels,
            local_count,
            max_stack,
        }
    }

    /// Accessor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Op stream
    pub fn code(&self) -> &[Op] {
        &self.code
    }

    /// Maximum operand stack depth
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Local count
    pub fn local_count(&self) -> usize {
        self.local_count
    }

    /// Execute the body over a frame
    pub fn invoke(&self, frame: Frame<'_>) -> AccessorResult<Value> {
        let mut stack: Vec<Value> = Vec::with_capacity(self.max_stack);
        let mut locals = vec![Value::Null; self.local_count];
        let mut pc = 0;

        while let Some(op) = self.code.get(pc) {
            pc += 1;
            match op {
                Op::LoadReceiver => stack.push(frame.receiver.clone()),
                Op::LoadInput => stack.push(frame.input.clone()),
                Op::LoadArgument(index) => {
                    let args = frame.arguments.ok_or(RuntimeError::NullReference)?;
                    let arg = args.get(*index).ok_or(RuntimeError::IndexOutOfRange {
                        index: *index,
                        len: args.len(),
                    })?;
                    stack.push(arg.clone());
                }
                Op::LoadArgumentCount => {
                    let args = frame.arguments.ok_or(RuntimeError::NullReference)?;
                    stack.push(Value::Int32(i32::try_from(args.len()).unwrap_or(i32::MAX)));
                }
                Op::LoadNull => stack.push(Value::Null),
                Op::LoadInt32(v) => stack.push(Value::Int32(*v)),
                Op::StoreLocal(index) => {
                    let value = pop(&mut stack)?;
                    *local_mut(&mut locals, *index)? = value;
                }
                Op::LoadLocal(index) => {
                    let value = local_mut(&mut locals, *index)?.clone();
                    stack.push(value);
                }

                Op::Branch(label) => pc = self.resolve(*label)?,
                Op::BranchIfNotNull(label) => {
                    if !pop(&mut stack)?.is_null() {
                        pc = self.resolve(*label)?;
                    }
                }
                Op::BranchIfArgumentsPresent(label) => {
                    if frame.arguments.is_some() {
                        pc = self.resolve(*label)?;
                    }
                }
                Op::BranchIfGreaterOrEqual(label) => {
                    let b = pop_i32(&mut stack)?;
                    let a = pop_i32(&mut stack)?;
                    if a >= b {
                        pc = self.resolve(*label)?;
                    }
                }
                Op::ThrowArgumentNull(param) => {
                    return Err(AccessorError::NullArgument { param: *param });
                }
                Op::ThrowNotEnoughArguments { param, required } => {
                    return Err(AccessorError::NotEnoughArguments {
                        param: *param,
                        required: *required,
                        supplied: frame.arguments.map_or(0, <[Value]>::len),
                    });
                }

                Op::CastReference(type_def) => {
                    let value = pop(&mut stack)?;
                    stack.push(coerce::cast_reference(&value, type_def)?);
                }
                Op::CastValue(type_def) => {
                    let value = pop(&mut stack)?;
                    stack.push(coerce::cast_value(&value, type_def)?);
                }
                Op::Box(_) => {
                    let value = pop(&mut stack)?;
                    stack.push(coerce::box_value(&value));
                }

                Op::LoadField(slot) => {
                    let target = expect_object(pop(&mut stack)?)?;
                    stack.push(target.load(*slot)?);
                }
                Op::StoreField(slot) => {
                    let value = pop(&mut stack)?;
                    let target = expect_object(pop(&mut stack)?)?;
                    target.store(*slot, value)?;
                }
                Op::LoadStaticField(cell) => stack.push(cell.get()),
                Op::StoreStaticField(cell) => cell.set(pop(&mut stack)?),

                Op::Call(method) | Op::CallVirtual(method) => {
                    let args = pop_n(&mut stack, method.parameters.len())?;
                    let receiver = if method.is_static {
                        None
                    } else {
                        Some(expect_object(pop(&mut stack)?)?)
                    };
                    let target = match (&receiver, op) {
                        (Some(obj), Op::CallVirtual(_)) => obj.type_def().resolve_virtual(method),
                        _ => Some(Arc::clone(method)),
                    };
                    let body = target.as_ref().and_then(|m| m.body.as_ref()).ok_or_else(|| {
                        RuntimeError::MissingImplementation {
                            method: method.name.clone(),
                            type_name: receiver.as_ref().map_or_else(
                                || "<static>".to_string(),
                                |r| r.type_def().name().to_string(),
                            ),
                        }
                    })?;
                    let result = body(&Invocation::new(receiver.as_ref(), &args))?;
                    if !method.returns_void() {
                        stack.push(result);
                    }
                }
                Op::NewObject {
                    type_def,
                    arity,
                    body,
                } => {
                    let args = pop_n(&mut stack, *arity)?;
                    let instance = rapid_meta::Object::zeroed(type_def);
                    if let Some(body) = body {
                        body(&Invocation::new(Some(&instance), &args))?;
                    }
                    stack.push(Value::Object(instance));
                }
                Op::InitObject(type_def) => stack.push(Value::zero_of(type_def)),

                Op::Return => return pop(&mut stack),
                Op::ReturnVoid => return Ok(Value::Null),
            }
        }

        Err(AccessorError::Emit(format!("{} ran past its last instruction", self.name)))
    }

    fn resolve(&self, label: Label) -> AccessorResult<usize> {
        self.labels
            .get(label.id)
            .copied()
            .ok_or_else(|| AccessorError::Emit(format!("Unknown label {}", label.id)))
    }
}

impl fmt::Debug for DynamicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicMethod")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("max_stack", &self.max_stack)
            .finish()
    }
}

fn pop(stack: &mut Vec<Value>) -> AccessorResult<Value> {
    stack
        .pop()
        .ok_or_else(|| AccessorError::Emit("operand stack underflow".to_string()))
}

fn pop_n(stack: &mut Vec<Value>, count: usize) -> AccessorResult<Vec<Value>> {
    let start = stack
        .len()
        .checked_sub(count)
        .ok_or_else(|| AccessorError::Emit("operand stack underflow".to_string()))?;
    Ok(stack.split_off(start))
}

fn pop_i32(stack: &mut Vec<Value>) -> AccessorResult<i32> {
    let value = pop(stack)?;
    value.as_i32().ok_or_else(|| {
        AccessorError::Runtime(RuntimeError::InvalidCast {
            from: value.type_name(),
            to: "Int32".to_string(),
        })
    })
}

fn local_mut(locals: &mut [Value], index: usize) -> AccessorResult<&mut Value> {
    locals
        .get_mut(index)
        .ok_or_else(|| AccessorError::Emit(format!("Unknown local {}", index)))
}

fn expect_object(value: Value) -> Result<ObjectRef, RuntimeError> {
    match value {
        Value::Object(obj) => Ok(obj),
        Value::Null => Err(RuntimeError::NullReference),
        other => Err(RuntimeError::InvalidCast {
            from: other.type_name(),
            to: "Object".to_string(),
        }),
    }
}
