//! Builder for accessor op streams
//!
//! Tracks the abstract operand stack while ops are emitted, so a malformed
//! body is rejected when it is built rather than when it runs.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use rapid_meta::{MethodInfo, TypeDef, TypeHandle};

use super::exec::DynamicMethod;
use super::opcode::{Label, Op};
use crate::error::{AccessorError, AccessorResult};

/// Result of op stream validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<String>,
}

/// Builder for constructing accessor bodies
#[derive(Debug)]
pub struct IlBuilder {
    name: String,
    code: Vec<Op>,
    local_count: usize,
    next_label_id: usize,
    /// Label ID -> instruction index
    label_positions: FxHashMap<usize, usize>,
    used_labels: Vec<Label>,
    stack_depth: usize,
    max_stack_depth: usize,
}

impl IlBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: Vec::with_capacity(16),
            local_count: 0,
            next_label_id: 0,
            label_positions: FxHashMap::default(),
            used_labels: Vec::new(),
            stack_depth: 0,
            max_stack_depth: 0,
        }
    }

    /// Name of the accessor being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current abstract stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack_depth
    }

    /// Emit an op
    pub fn emit(&mut self, op: Op) -> AccessorResult<()> {
        let (pops, pushes) = op.stack_effect();
        if self.stack_depth < pops {
            return Err(AccessorError::Emit(format!(
                "Stack underflow at instruction {} ({:?}) in {}",
                self.code.len(),
                op,
                self.name
            )));
        }
        self.stack_depth = self.stack_depth - pops + pushes;
        self.max_stack_depth = self.max_stack_depth.max(self.stack_depth);
        if let Some(label) = op.target() {
            self.used_labels.push(label);
        }
        self.code.push(op);
        Ok(())
    }

    /// Define a new label
    pub fn define_label(&mut self) -> Label {
        let label = Label {
            id: self.next_label_id,
        };
        self.next_label_id += 1;
        label
    }

    /// Mark a label at the next instruction
    pub fn mark_label(&mut self, label: Label) -> AccessorResult<()> {
        if label.id >= self.next_label_id {
            return Err(AccessorError::Emit(format!("Label {} was never defined", label.id)));
        }
        if self.label_positions.insert(label.id, self.code.len()).is_some() {
            return Err(AccessorError::Emit(format!("Label {} is marked twice", label.id)));
        }
        Ok(())
    }

    /// Declare a local, returning its index
    pub fn declare_local(&mut self) -> usize {
        self.local_count += 1;
        self.local_count - 1
    }

    // ===== Helpers =====

    /// Emit a reference cast; casts to `Object` are elided
    pub fn emit_cast_reference(&mut self, type_def: &Arc<TypeDef>) -> AccessorResult<()> {
        if type_def.handle() == TypeHandle::OBJECT {
            return Ok(());
        }
        self.emit(Op::CastReference(Arc::clone(type_def)))
    }

    /// Emit a value coercion
    pub fn emit_cast_value(&mut self, type_def: &Arc<TypeDef>) -> AccessorResult<()> {
        self.emit(Op::CastValue(Arc::clone(type_def)))
    }

    /// Emit a box for value types
    pub fn emit_box_if_needed(&mut self, type_def: &TypeDef) -> AccessorResult<()> {
        if type_def.is_value_type() {
            self.emit(Op::Box(type_def.handle()))?;
        }
        Ok(())
    }

    /// Emit a call, dispatching virtual instance methods dynamically
    pub fn emit_call_method(&mut self, method: &Arc<MethodInfo>) -> AccessorResult<()> {
        if method.is_virtual() && !method.is_static {
            self.emit(Op::CallVirtual(Arc::clone(method)))
        } else {
            self.emit(Op::Call(Arc::clone(method)))
        }
    }

    // ===== Validation =====

    /// Validate the op stream
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        for label in &self.used_labels {
            if !self.label_positions.contains_key(&label.id) {
                errors.push(format!("Label {} is used but never marked", label.id));
            }
        }

        if self.stack_depth != 0 {
            errors.push(format!(
                "Stack not balanced: {} values remaining",
                self.stack_depth
            ));
        }

        let terminated = matches!(
            self.code.last(),
            Some(
                Op::Return
                    | Op::ReturnVoid
                    | Op::ThrowArgumentNull(_)
                    | Op::ThrowNotEnoughArguments { .. }
            )
        );
        if !terminated {
            errors.push("Op stream does not end in a return".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Build the accessor body, resolving all labels
    pub fn build(self) -> AccessorResult<DynamicMethod> {
        let validation = self.validate();
        if !validation.is_valid {
            return Err(AccessorError::Emit(format!(
                "Validation of {} failed: {}",
                self.name,
                validation.errors.join("; ")
            )));
        }

        let mut labels = vec![0; self.next_label_id];
        for (&id, &position) in &self.label_positions {
            labels[id] = position;
        }

        Ok(DynamicMethod::new(
            self.name,
            self.code,
            labels,
            self.local_count,
            self.max_stack_depth,
        ))
    }
}
