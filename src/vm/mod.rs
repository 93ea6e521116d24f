//! Reference emulator for generated assembly.
//!
//! [`Machine`] executes an [`AsmProgram`](bilby_compiler::AsmProgram)
//! directly from its instruction list:
//!
//! - memory is a flat byte array; `DLabel`/`Data*` directives fill it from
//!   address 0 when the program is loaded
//! - the operand stack holds `i32` values, including return addresses
//! - code labels evaluate to instruction indices
//! - `Printf` output is captured rather than written to stdout

mod machine;
mod memory;

pub use machine::Machine;
pub use memory::Memory;

/// Emulator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Bytes of memory; `Memtop` pushes this value.
    pub memory_size: usize,
    /// Instructions executed before giving up.
    pub step_limit: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: 1 << 20,
            step_limit: 10_000_000,
        }
    }
}
