//! Assembly output: opcodes, instructions, fragments and whole programs.

mod fragment;
mod instruction;
mod opcode;

pub use fragment::{Fragment, FragmentKind, load_opcode, store_opcode};
pub use instruction::{Instruction, Operand};
pub use opcode::OpCode;

use std::fmt;

/// A complete generated program, ready to print or execute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsmProgram {
    instructions: Vec<Instruction>,
}

impl AsmProgram {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Every label defined by a `Label` or `DLabel` directive, in order.
    pub fn defined_labels(&self) -> impl Iterator<Item = &str> {
        self.instructions
            .iter()
            .filter(|i| matches!(i.opcode, OpCode::Label | OpCode::DLabel))
            .filter_map(Instruction::label)
    }

    /// Number of instructions with the given opcode.
    pub fn count(&self, opcode: OpCode) -> usize {
        self.instructions.iter().filter(|i| i.opcode == opcode).count()
    }
}

impl From<Fragment> for AsmProgram {
    fn from(fragment: Fragment) -> Self {
        Self::new(fragment.into_instructions())
    }
}

impl fmt::Display for AsmProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
