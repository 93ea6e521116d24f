//! Instruction execution.

use bilby_compiler::asm::{AsmProgram, Instruction, OpCode, Operand};
use bilby_core::RuntimeError;
use rustc_hash::FxHashMap;

use super::memory::Memory;
use super::MachineConfig;

/// Where every label points once the program is loaded.
#[derive(Debug, Default)]
struct Image {
    /// Code labels resolve to instruction indices.
    code: FxHashMap<String, usize>,
    /// Data labels resolve to byte addresses.
    data: FxHashMap<String, i32>,
    data_size: usize,
}

impl Image {
    fn address_of(&self, label: &str) -> Result<i32, RuntimeError> {
        if let Some(address) = self.data.get(label) {
            return Ok(*address);
        }
        self.code
            .get(label)
            .map(|index| *index as i32)
            .ok_or_else(|| RuntimeError::UnknownLabel {
                label: label.to_string(),
            })
    }

    fn target_of(&self, label: &str) -> Result<usize, RuntimeError> {
        self.code
            .get(label)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownLabel {
                label: label.to_string(),
            })
    }
}

/// Executes generated assembly.
pub struct Machine {
    config: MachineConfig,
    memory: Memory,
    stack: Vec<i32>,
    output: String,
    steps: u64,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            memory: Memory::new(config.memory_size),
            config,
            stack: Vec::new(),
            output: String::new(),
            steps: 0,
        }
    }

    /// Text printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Instructions executed by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn stack(&self) -> &[i32] {
        &self.stack
    }

    /// Load `program` and execute it from its first instruction until `Halt`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&mut self, program: &AsmProgram) -> Result<(), RuntimeError> {
        let _span = tracing::debug_span!("run").entered();

        self.memory = Memory::new(self.config.memory_size);
        self.stack.clear();
        self.steps = 0;

        let instructions = program.instructions();
        let image = self.load(instructions)?;
        tracing::debug!(
            instructions = instructions.len(),
            data_bytes = image.data_size,
            "loaded program"
        );

        let mut pc = 0usize;
        loop {
            let Some(instruction) = instructions.get(pc) else {
                return Err(RuntimeError::RanOffEnd);
            };
            self.steps += 1;
            if self.steps > self.config.step_limit {
                return Err(RuntimeError::StepLimitExceeded {
                    limit: self.config.step_limit,
                });
            }

            let at = pc;
            pc += 1;
            match instruction.opcode {
                OpCode::Label | OpCode::DLabel | OpCode::DataZ | OpCode::DataS => {}

                OpCode::PushI => self.stack.push(int_operand(instruction)),
                OpCode::PushD => {
                    let address = image.address_of(label_operand(instruction))?;
                    self.stack.push(address);
                }
                OpCode::Pop => {
                    self.pop(at)?;
                }
                OpCode::Duplicate => {
                    let top = self.pop(at)?;
                    self.stack.push(top);
                    self.stack.push(top);
                }
                OpCode::Exchange => {
                    let top = self.pop(at)?;
                    let below = self.pop(at)?;
                    self.stack.push(top);
                    self.stack.push(below);
                }

                OpCode::Add => self.binary(at, i32::wrapping_add)?,
                OpCode::Subtract => self.binary(at, i32::wrapping_sub)?,
                OpCode::Multiply => self.binary(at, i32::wrapping_mul)?,
                OpCode::Negate => {
                    let value = self.pop(at)?;
                    self.stack.push(value.wrapping_neg());
                }

                OpCode::LoadI => {
                    let address = self.pop(at)?;
                    let value = self.memory.read_i32(address, at)?;
                    self.stack.push(value);
                }
                OpCode::LoadC => {
                    let address = self.pop(at)?;
                    let value = self.memory.read_u8(address, at)?;
                    self.stack.push(i32::from(value));
                }
                OpCode::StoreI => {
                    let value = self.pop(at)?;
                    let address = self.pop(at)?;
                    self.memory.write_i32(address, value, at)?;
                }
                OpCode::StoreC => {
                    let value = self.pop(at)?;
                    let address = self.pop(at)?;
                    self.memory.write_u8(address, value as u8, at)?;
                }
                OpCode::Memtop => self.stack.push(self.memory.size() as i32),

                OpCode::Jump => pc = image.target_of(label_operand(instruction))?,
                OpCode::JumpFalse => {
                    if self.pop(at)? == 0 {
                        pc = image.target_of(label_operand(instruction))?;
                    }
                }
                OpCode::JumpTrue => {
                    if self.pop(at)? != 0 {
                        pc = image.target_of(label_operand(instruction))?;
                    }
                }
                OpCode::JumpPos => {
                    if self.pop(at)? > 0 {
                        pc = image.target_of(label_operand(instruction))?;
                    }
                }
                OpCode::CallV => {
                    let target = self.pop(at)?;
                    let destination = code_address(target, instructions.len(), at)?;
                    self.stack.push(pc as i32);
                    pc = destination;
                }
                OpCode::Return => {
                    let target = self.pop(at)?;
                    pc = code_address(target, instructions.len(), at)?;
                }
                OpCode::Halt => break,

                OpCode::Printf => self.printf(at)?,
            }
        }

        tracing::debug!(steps = self.steps, "halted");
        Ok(())
    }

    /// Resolve labels and lay out the data segment.
    fn load(&mut self, instructions: &[Instruction]) -> Result<Image, RuntimeError> {
        let mut image = Image::default();
        for (index, instruction) in instructions.iter().enumerate() {
            match instruction.opcode {
                OpCode::Label => {
                    let label = label_operand(instruction);
                    if image.data.contains_key(label)
                        || image.code.insert(label.to_string(), index).is_some()
                    {
                        return Err(RuntimeError::DuplicateLabel {
                            label: label.to_string(),
                        });
                    }
                }
                OpCode::DLabel => {
                    let label = label_operand(instruction);
                    if image.code.contains_key(label)
                        || image
                            .data
                            .insert(label.to_string(), image.data_size as i32)
                            .is_some()
                    {
                        return Err(RuntimeError::DuplicateLabel {
                            label: label.to_string(),
                        });
                    }
                }
                OpCode::DataZ => {
                    image.data_size += int_operand(instruction).max(0) as usize;
                }
                OpCode::DataS => {
                    let text = match &instruction.operand {
                        Some(Operand::Str(text)) => text.as_str(),
                        _ => "",
                    };
                    self.memory.write_c_string(image.data_size, text)?;
                    image.data_size += text.len() + 1;
                }
                _ => {}
            }
        }

        if image.data_size > self.memory.size() {
            return Err(RuntimeError::OutOfMemory {
                required: image.data_size,
                available: self.memory.size(),
            });
        }

        for instruction in instructions {
            match instruction.opcode {
                OpCode::PushD => {
                    image.address_of(label_operand(instruction))?;
                }
                OpCode::Jump | OpCode::JumpFalse | OpCode::JumpTrue | OpCode::JumpPos => {
                    image.target_of(label_operand(instruction))?;
                }
                _ => {}
            }
        }
        Ok(image)
    }

    fn pop(&mut self, pc: usize) -> Result<i32, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow { pc })
    }

    fn binary(&mut self, pc: usize, op: fn(i32, i32) -> i32) -> Result<(), RuntimeError> {
        let right = self.pop(pc)?;
        let left = self.pop(pc)?;
        self.stack.push(op(left, right));
        Ok(())
    }

    /// Pop a format address, then one argument per conversion (last first).
    fn printf(&mut self, pc: usize) -> Result<(), RuntimeError> {
        let address = self.pop(pc)?;
        let format = self.memory.read_c_string(address, pc)?;

        let conversions = format.matches('%').count() - 2 * format.matches("%%").count();
        let mut args = Vec::with_capacity(conversions);
        for _ in 0..conversions {
            args.push(self.pop(pc)?);
        }
        args.reverse();

        let mut args = args.into_iter();
        let mut chars = format.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                self.output.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => self.output.push('%'),
                Some('d') => {
                    let value = args.next().unwrap_or_default();
                    self.output.push_str(&value.to_string());
                }
                Some('s') => {
                    let value = args.next().unwrap_or_default();
                    let text = self.memory.read_c_string(value, pc)?;
                    self.output.push_str(&text);
                }
                _ => return Err(RuntimeError::BadFormat { format }),
            }
        }
        Ok(())
    }
}

fn int_operand(instruction: &Instruction) -> i32 {
    instruction.int().unwrap_or(0)
}

fn label_operand(instruction: &Instruction) -> &str {
    instruction.label().unwrap_or("")
}

fn code_address(target: i32, len: usize, pc: usize) -> Result<usize, RuntimeError> {
    usize::try_from(target)
        .ok()
        .filter(|index| *index < len)
        .ok_or(RuntimeError::BadJumpTarget { target, pc })
}
