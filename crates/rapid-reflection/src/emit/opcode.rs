//! Accessor instruction set

use std::fmt;
use std::sync::Arc;

use rapid_meta::{MethodInfo, NativeConstructor, StaticCell, TypeDef, TypeHandle};

/// A label for jump targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    /// Unique label ID within the builder
    pub id: usize,
}

/// A single accessor instruction
///
/// Operands referring to metadata are resolved when the accessor is compiled,
/// so executing an op never consults a registry.
#[derive(Clone)]
pub enum Op {
    // ===== Frame =====
    /// Push the receiver
    LoadReceiver,
    /// Push the setter input value
    LoadInput,
    /// Push argument `i`; faults on an absent or short argument array
    LoadArgument(usize),
    /// Push the argument count as `Int32`; faults on an absent array
    LoadArgumentCount,

    // ===== Constants and locals =====
    /// Push null
    LoadNull,
    /// Push an `Int32` constant
    LoadInt32(i32),
    /// Pop into a local
    StoreLocal(usize),
    /// Push a local
    LoadLocal(usize),

    // ===== Control flow =====
    /// Unconditional jump
    Branch(Label),
    /// Pop; jump if not null
    BranchIfNotNull(Label),
    /// Jump if an argument array was supplied
    BranchIfArgumentsPresent(Label),
    /// Pop `b`, pop `a`; jump if `a >= b`
    BranchIfGreaterOrEqual(Label),
    /// Fail with `NullArgument`
    ThrowArgumentNull(&'static str),
    /// Fail with `NotEnoughArguments`
    ThrowNotEnoughArguments {
        /// Name of the argument array parameter
        param: &'static str,
        /// Declared parameter count
        required: usize,
    },

    // ===== Coercion =====
    /// Pop; check reference assignability to the type, push unchanged
    CastReference(Arc<TypeDef>),
    /// Pop; coerce to the type, push the result
    CastValue(Arc<TypeDef>),
    /// Pop; copy a boxed value type, push
    Box(TypeHandle),

    // ===== Members =====
    /// Pop object; push instance slot
    LoadField(usize),
    /// Pop value, pop object; store instance slot
    StoreField(usize),
    /// Push a static field
    LoadStaticField(StaticCell),
    /// Pop; store a static field
    StoreStaticField(StaticCell),
    /// Pop arguments (and receiver); call the method as declared
    Call(Arc<MethodInfo>),
    /// Pop arguments and receiver; call the receiver's most derived override
    CallVirtual(Arc<MethodInfo>),
    /// Pop arguments; push a new instance after running the initializer
    NewObject {
        /// Type to instantiate
        type_def: Arc<TypeDef>,
        /// Constructor parameter count
        arity: usize,
        /// Initializer
        body: Option<NativeConstructor>,
    },
    /// Push the zero value of a value type
    InitObject(Arc<TypeDef>),

    // ===== Return =====
    /// Pop and return
    Return,
    /// Return null
    ReturnVoid,
}

impl Op {
    /// Net effect on the operand stack: `(pops, pushes)`
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Op::LoadReceiver
            | Op::LoadInput
            | Op::LoadArgument(_)
            | Op::LoadArgumentCount
            | Op::LoadNull
            | Op::LoadInt32(_)
            | Op::LoadLocal(_)
            | Op::LoadStaticField(_)
            | Op::InitObject(_) => (0, 1),
            Op::StoreLocal(_)
            | Op::BranchIfNotNull(_)
            | Op::StoreStaticField(_)
            | Op::Return => (1, 0),
            Op::Branch(_)
            | Op::BranchIfArgumentsPresent(_)
            | Op::ThrowArgumentNull(_)
            | Op::ThrowNotEnoughArguments { .. }
            | Op::ReturnVoid => (0, 0),
            Op::BranchIfGreaterOrEqual(_) | Op::StoreField(_) => (2, 0),
            Op::CastReference(_) | Op::CastValue(_) | Op::Box(_) | Op::LoadField(_) => (1, 1),
            Op::Call(method) | Op::CallVirtual(method) => {
                let receiver = usize::from(!method.is_static);
                let result = usize::from(!method.returns_void());
                (method.parameters.len() + receiver, result)
            }
            Op::NewObject { arity, .. } => (*arity, 1),
        }
    }

    /// Jump target, if any
    pub fn target(&self) -> Option<Label> {
        match self {
            Op::Branch(label)
            | Op::BranchIfNotNull(label)
            | Op::BranchIfArgumentsPresent(label)
            | Op::BranchIfGreaterOrEqual(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::LoadReceiver => write!(f, "ldrecv"),
            Op::LoadInput => write!(f, "ldinput"),
            Op::LoadArgument(i) => write!(f, "ldarg {}", i),
            Op::LoadArgumentCount => write!(f, "ldargc"),
            Op::LoadNull => write!(f, "ldnull"),
            Op::LoadInt32(v) => write!(f, "ldc.i4 {}", v),
            Op::StoreLocal(i) => write!(f, "stloc {}", i),
            Op::LoadLocal(i) => write!(f, "ldloc {}", i),
            Op::Branch(l) => write!(f, "br L{}", l.id),
            Op::BranchIfNotNull(l) => write!(f, "brtrue L{}", l.id),
            Op::BranchIfArgumentsPresent(l) => write!(f, "brargs L{}", l.id),
            Op::BranchIfGreaterOrEqual(l) => write!(f, "bge L{}", l.id),
            Op::ThrowArgumentNull(p) => write!(f, "throw.null {}", p),
            Op::ThrowNotEnoughArguments { param, required } => {
                write!(f, "throw.argc {} {}", param, required)
            }
            Op::CastReference(t) => write!(f, "castclass {}", t.name()),
            Op::CastValue(t) => write!(f, "castvalue {}", t.name()),
            Op::Box(t) => write!(f, "box {}", t),
            Op::LoadField(slot) => write!(f, "ldfld {}", slot),
            Op::StoreField(slot) => write!(f, "stfld {}", slot),
            Op::LoadStaticField(_) => write!(f, "ldsfld"),
            Op::StoreStaticField(_) => write!(f, "stsfld"),
            Op::Call(m) => write!(f, "call {}", m.name),
            Op::CallVirtual(m) => write!(f, "callvirt {}", m.name),
            Op::NewObject { type_def, arity, .. } => {
                write!(f, "newobj {}/{}", type_def.name(), arity)
            }
            Op::InitObject(t) => write!(f, "initobj {}", t.name()),
            Op::Return => write!(f, "ret"),
            Op::ReturnVoid => write!(f, "ret.void"),
        }
    }
}
