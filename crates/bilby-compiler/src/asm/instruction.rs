//! A single assembly instruction and its text form.

use std::fmt;

use super::OpCode;

const OPCODE_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i32),
    Label(String),
    Str(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{value}"),
            Operand::Label(label) => f.write_str(label),
            Operand::Str(text) => {
                f.write_str("\"")?;
                for ch in text.chars() {
                    match ch {
                        '\n' => f.write_str("\\n")?,
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{ch}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operand: Option<Operand>,
    /// Trailing annotation, already carrying its `%%` marker.
    pub comment: Option<String>,
}

impl Instruction {
    pub fn new(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: None,
            comment: None,
        }
    }

    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operand: Some(operand),
            comment: None,
        }
    }

    /// The label operand, if this instruction carries one.
    pub fn label(&self) -> Option<&str> {
        match &self.operand {
            Some(Operand::Label(label)) => Some(label),
            _ => None,
        }
    }

    pub fn int(&self) -> Option<i32> {
        match self.operand {
            Some(Operand::Int(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::from("        ");
        line.push_str(&format!("{:<width$}", self.opcode.name(), width = OPCODE_WIDTH));
        if let Some(operand) = &self.operand {
            line.push_str(&operand.to_string());
        }
        if let Some(comment) = &self.comment {
            line.push(' ');
            line.push_str(comment);
        }
        f.write_str(line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_opcode_and_operand() {
        let push = Instruction::with_operand(OpCode::PushI, Operand::Int(-8));
        assert_eq!(push.to_string(), "        PushI       -8");
        assert_eq!(Instruction::new(OpCode::Halt).to_string(), "        Halt");
    }

    #[test]
    fn renders_comment() {
        let mut push = Instruction::with_operand(
            OpCode::PushD,
            Operand::Label("$global-memory-block".into()),
        );
        push.comment = Some("%% x".into());
        assert_eq!(push.to_string(), "        PushD       $global-memory-block %% x");
    }

    #[test]
    fn escapes_strings() {
        let data = Instruction::with_operand(OpCode::DataS, Operand::Str("\n".into()));
        assert_eq!(data.to_string(), "        DataS       \"\\n\"");
    }

    #[test]
    fn operand_accessors() {
        let jump = Instruction::with_operand(OpCode::Jump, Operand::Label("end".into()));
        assert_eq!(jump.label(), Some("end"));
        assert_eq!(jump.int(), None);
    }
}
