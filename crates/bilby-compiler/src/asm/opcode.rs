//! Assembly operation codes.
//!
//! The target is a stack machine: arithmetic pops its operands from the
//! operand stack and pushes the result. Memory is byte addressed; the call
//! stack and frames live in memory and are managed by generated code through
//! the `$stack-pointer` and `$frame-pointer` cells.

use std::fmt;

/// Assembly operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // =========================================================================
    // Directives
    // =========================================================================
    /// Mark a code location.
    /// Operand: label
    Label,
    /// Mark a data location.
    /// Operand: label
    DLabel,
    /// Reserve zero-filled data bytes.
    /// Operand: byte count
    DataZ,
    /// Emit a NUL-terminated string into data memory.
    /// Operand: string
    DataS,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Push an integer constant.
    /// Operand: integer
    PushI,
    /// Push the address of a label.
    /// Operand: label
    PushD,
    /// Discard the top of stack.
    Pop,
    /// Duplicate the top of stack.
    Duplicate,
    /// Swap the two topmost values.
    Exchange,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// `[a b] -> [a + b]`
    Add,
    /// `[a b] -> [a - b]`
    Subtract,
    /// `[a b] -> [a * b]`
    Multiply,
    /// `[a] -> [-a]`
    Negate,

    // =========================================================================
    // Memory
    // =========================================================================
    /// `[addr] -> [i32 at addr]`
    LoadI,
    /// `[addr] -> [byte at addr]`
    LoadC,
    /// `[addr value] -> []`, writes four bytes.
    StoreI,
    /// `[addr value] -> []`, writes the low byte.
    StoreC,
    /// Push the first address past the end of memory.
    Memtop,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional jump.
    /// Operand: label
    Jump,
    /// Pop; jump when zero.
    /// Operand: label
    JumpFalse,
    /// Pop; jump when non-zero.
    /// Operand: label
    JumpTrue,
    /// Pop; jump when strictly positive.
    /// Operand: label
    JumpPos,
    /// Pop a code address, push the return address, jump.
    CallV,
    /// Pop a code address and jump to it.
    Return,
    /// Stop the machine.
    Halt,

    // =========================================================================
    // I/O
    // =========================================================================
    /// Pop a format string address, then one argument per conversion.
    Printf,
}

impl OpCode {
    /// Get the mnemonic used in assembly text.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Label => "Label",
            OpCode::DLabel => "DLabel",
            OpCode::DataZ => "DataZ",
            OpCode::DataS => "DataS",
            OpCode::PushI => "PushI",
            OpCode::PushD => "PushD",
            OpCode::Pop => "Pop",
            OpCode::Duplicate => "Duplicate",
            OpCode::Exchange => "Exchange",
            OpCode::Add => "Add",
            OpCode::Subtract => "Subtract",
            OpCode::Multiply => "Multiply",
            OpCode::Negate => "Negate",
            OpCode::LoadI => "LoadI",
            OpCode::LoadC => "LoadC",
            OpCode::StoreI => "StoreI",
            OpCode::StoreC => "StoreC",
            OpCode::Memtop => "Memtop",
            OpCode::Jump => "Jump",
            OpCode::JumpFalse => "JumpFalse",
            OpCode::JumpTrue => "JumpTrue",
            OpCode::JumpPos => "JumpPos",
            OpCode::CallV => "CallV",
            OpCode::Return => "Return",
            OpCode::Halt => "Halt",
            OpCode::Printf => "Printf",
        }
    }

    /// Directives lay out memory or name locations; they do nothing when executed.
    pub fn is_directive(&self) -> bool {
        matches!(
            self,
            OpCode::Label | OpCode::DLabel | OpCode::DataZ | OpCode::DataS
        )
    }

    /// Whether the opcode takes a label operand.
    pub fn takes_label(&self) -> bool {
        matches!(
            self,
            OpCode::Label
                | OpCode::DLabel
                | OpCode::PushD
                | OpCode::Jump
                | OpCode::JumpFalse
                | OpCode::JumpTrue
                | OpCode::JumpPos
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
