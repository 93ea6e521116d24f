//! The runtime environment emitted ahead of every program.
//!
//! It holds the data every program relies on: print formats, the boolean
//! strings and the stack and frame pointer cells.

use crate::asm::{Fragment, OpCode};

pub const MAIN_PROGRAM_LABEL: &str = "$$main";
pub const GLOBAL_MEMORY_BLOCK: &str = "$global-memory-block";
pub const STACK_POINTER: &str = "$stack-pointer";
pub const FRAME_POINTER: &str = "$frame-pointer";

pub const INTEGER_PRINT_FORMAT: &str = "$print-format-integer";
pub const BOOLEAN_PRINT_FORMAT: &str = "$print-format-boolean";
pub const NEWLINE_PRINT_FORMAT: &str = "$print-format-newline";
pub const SPACE_PRINT_FORMAT: &str = "$print-format-space";
pub const BOOLEAN_TRUE_STRING: &str = "$boolean-true-string";
pub const BOOLEAN_FALSE_STRING: &str = "$boolean-false-string";

/// Code placed before the global memory block.
pub fn environment() -> Fragment {
    let mut code = Fragment::void();
    code.add_label_operand(OpCode::Jump, MAIN_PROGRAM_LABEL);

    string_constant(&mut code, INTEGER_PRINT_FORMAT, "%d");
    string_constant(&mut code, BOOLEAN_PRINT_FORMAT, "%s");
    string_constant(&mut code, NEWLINE_PRINT_FORMAT, "\n");
    string_constant(&mut code, SPACE_PRINT_FORMAT, " ");
    string_constant(&mut code, BOOLEAN_TRUE_STRING, "true");
    string_constant(&mut code, BOOLEAN_FALSE_STRING, "false");

    code.add_label_operand(OpCode::DLabel, STACK_POINTER);
    code.add_int(OpCode::DataZ, 4);
    code.add_label_operand(OpCode::DLabel, FRAME_POINTER);
    code.add_int(OpCode::DataZ, 4);
    code
}

/// Code run first after `$$main`: both pointers start at the top of memory.
pub fn stack_initialization() -> Fragment {
    let mut code = Fragment::void();
    code.add(OpCode::Memtop);
    code.add(OpCode::Duplicate);
    code.store_i_to(STACK_POINTER);
    code.store_i_to(FRAME_POINTER);
    code
}

fn string_constant(code: &mut Fragment, label: &str, text: &str) {
    code.add_label_operand(OpCode::DLabel, label);
    code.add_string(OpCode::DataS, text);
}
