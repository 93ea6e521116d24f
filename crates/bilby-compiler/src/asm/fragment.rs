//! Code fragments: the unit of code generation.
//!
//! Every AST node produces exactly one fragment, which its parent consumes.
//! The fragment kind records what the code leaves on the operand stack.

use bilby_core::Type;

use super::{Instruction, OpCode, Operand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Leaves one value.
    Value,
    /// Leaves the address of a value.
    Address,
    /// Leaves nothing.
    Void,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    kind: FragmentKind,
    code: Vec<Instruction>,
}

impl Fragment {
    pub fn new(kind: FragmentKind) -> Self {
        Self {
            kind,
            code: Vec::new(),
        }
    }

    pub fn value() -> Self {
        Self::new(FragmentKind::Value)
    }

    pub fn address() -> Self {
        Self::new(FragmentKind::Address)
    }

    pub fn void() -> Self {
        Self::new(FragmentKind::Void)
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn is_address(&self) -> bool {
        self.kind == FragmentKind::Address
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn add(&mut self, opcode: OpCode) {
        self.code.push(Instruction::new(opcode));
    }

    pub fn add_int(&mut self, opcode: OpCode, value: i32) {
        self.code.push(Instruction::with_operand(opcode, Operand::Int(value)));
    }

    pub fn add_label_operand(&mut self, opcode: OpCode, label: &str) {
        self.code
            .push(Instruction::with_operand(opcode, Operand::Label(label.to_string())));
    }

    pub fn add_string(&mut self, opcode: OpCode, text: &str) {
        self.code
            .push(Instruction::with_operand(opcode, Operand::Str(text.to_string())));
    }

    /// `Label name`
    pub fn label(&mut self, name: &str) {
        self.add_label_operand(OpCode::Label, name);
    }

    /// Attach a comment to the most recent instruction.
    pub fn comment(&mut self, comment: &str) {
        if comment.is_empty() {
            return;
        }
        if let Some(last) = self.code.last_mut() {
            last.comment = Some(comment.to_string());
        }
    }

    /// Append another fragment's code, consuming it.
    pub fn append(&mut self, other: Fragment) {
        self.code.extend(other.code);
    }

    /// Append a child fragment, loading through it first when it is an address.
    pub fn append_value(&mut self, other: Fragment, ty: &Type) {
        let load = other.is_address();
        self.append(other);
        if load {
            self.add(load_opcode(ty));
        }
    }

    /// Push the value stored in the four-byte cell at `label`.
    pub fn load_i_from(&mut self, label: &str) {
        self.add_label_operand(OpCode::PushD, label);
        self.add(OpCode::LoadI);
    }

    /// Pop a value into the four-byte cell at `label`.
    pub fn store_i_to(&mut self, label: &str) {
        self.add_label_operand(OpCode::PushD, label);
        self.add(OpCode::Exchange);
        self.add(OpCode::StoreI);
    }

    pub fn strip_comments(&mut self) {
        for instruction in &mut self.code {
            instruction.comment = None;
        }
    }
}

/// The load matching a value type's size class.
pub fn load_opcode(ty: &Type) -> OpCode {
    match ty {
        Type::Boolean => OpCode::LoadC,
        _ => OpCode::LoadI,
    }
}

/// The store matching a value type's size class.
pub fn store_opcode(ty: &Type) -> OpCode {
    match ty {
        Type::Boolean => OpCode::StoreC,
        _ => OpCode::StoreI,
    }
}
