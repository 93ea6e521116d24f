//! Function definitions and the calling convention.
//!
//! On entry the caller has pushed the arguments onto the call stack and
//! `CallV` has left the return address on the operand stack. A frame looks
//! like this (addresses grow upward):
//!
//! ```text
//!           | argument n-1  |
//!           | ...           |
//! fp     -> | argument 0    |
//!           | saved fp      |  fp - 4
//!           | return addr   |  fp - 8
//!           | locals        |  fp - 8 - frame size
//! sp     -> |               |
//! ```

use bilby_parser::ast::FunctionDef;

use crate::asm::{Fragment, OpCode, store_opcode};
use crate::runtime::{FRAME_POINTER, STACK_POINTER};
use crate::scope::FRAME_LINKAGE_SIZE;

use super::CodeGenerator;

/// Label every `return` in the function jumps to.
pub fn epilogue_label(name: &str) -> String {
    format!("function-{name}-epilogue")
}

impl<'a> CodeGenerator<'a> {
    /// Store a function's code address into the global cell bound to its name.
    pub(super) fn function_address_store(&mut self, function: &FunctionDef<'_>) -> Fragment {
        let mut code = Fragment::void();
        self.binding_of(function.name.id).generate_address(&mut code);
        code.add_label_operand(OpCode::PushD, function.name.name);
        code.add(OpCode::StoreI);
        code
    }

    /// Code layout:
    /// ```text
    /// Label name
    /// [save caller fp at sp - 4]
    /// [save return address at sp - 8]
    /// [fp = sp]
    /// [sp -= 8 + frame size]
    /// [body]
    /// Label function-name-epilogue
    /// [push return address from fp - 8]
    /// [sp = fp]
    /// [fp = saved fp]
    /// [move return value onto the call stack]   non-void only
    /// Return
    /// ```
    pub(super) fn generate_function(&mut self, function: &FunctionDef<'_>) -> Fragment {
        let name = function.name.name;
        let result = function.return_type.kind.to_type();
        let frame_size = self
            .analysis
            .scope_of(function.body.id)
            .map(|scope| self.analysis.scopes.allocated_size(scope))
            .unwrap_or(0);
        let epilogue = epilogue_label(name);

        let mut code = Fragment::void();
        code.label(name);
        code.comment(&format!("%% function {name}"));

        code.load_i_from(STACK_POINTER);
        code.add_int(OpCode::PushI, 4);
        code.add(OpCode::Subtract);
        code.load_i_from(FRAME_POINTER);
        code.add(OpCode::StoreI);

        code.load_i_from(STACK_POINTER);
        code.add_int(OpCode::PushI, FRAME_LINKAGE_SIZE);
        code.add(OpCode::Subtract);
        code.add(OpCode::Exchange);
        code.add(OpCode::StoreI);

        code.load_i_from(STACK_POINTER);
        code.store_i_to(FRAME_POINTER);

        code.load_i_from(STACK_POINTER);
        code.add_int(OpCode::PushI, FRAME_LINKAGE_SIZE);
        code.add(OpCode::Subtract);
        code.add_int(OpCode::PushI, frame_size as i32);
        code.add(OpCode::Subtract);
        code.store_i_to(STACK_POINTER);

        let outer = self.epilogue.replace(epilogue.clone());
        code.append(self.generate_block(&function.body));
        self.epilogue = outer;

        code.label(&epilogue);
        code.load_i_from(FRAME_POINTER);
        code.add_int(OpCode::PushI, FRAME_LINKAGE_SIZE);
        code.add(OpCode::Subtract);
        code.add(OpCode::LoadI);

        code.load_i_from(FRAME_POINTER);
        code.store_i_to(STACK_POINTER);

        code.load_i_from(FRAME_POINTER);
        code.add_int(OpCode::PushI, 4);
        code.add(OpCode::Subtract);
        code.add(OpCode::LoadI);
        code.store_i_to(FRAME_POINTER);

        if result.is_value() {
            code.add(OpCode::Exchange);
            code.load_i_from(STACK_POINTER);
            code.add_int(OpCode::PushI, result.size() as i32);
            code.add(OpCode::Subtract);
            code.store_i_to(STACK_POINTER);
            code.load_i_from(STACK_POINTER);
            code.add(OpCode::Exchange);
            code.add(store_opcode(&result));
        }
        code.add(OpCode::Return);

        tracing::trace!(
            function = name,
            frame_size,
            instructions = code.len(),
            "generated function"
        );
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::tests::{generate, opcodes_after_label};

    #[test]
    fn prologue_reserves_linkage_and_locals() {
        let program = generate(
            "func int f(int a) { imm x := a; imm y := true; return x; } main { }",
        );
        let body = opcodes_after_label(&program, "f");
        assert_eq!(
            &body[..5],
            [
                OpCode::PushD,
                OpCode::LoadI,
                OpCode::PushI,
                OpCode::Subtract,
                OpCode::PushD
            ]
        );

        let frame_reservation: Vec<i32> = program
            .instructions()
            .iter()
            .skip_while(|i| !(i.opcode == OpCode::Label && i.label() == Some("f")))
            .filter(|i| i.opcode == OpCode::PushI)
            .filter_map(|i| i.int())
            .take(4)
            .collect();
        assert_eq!(frame_reservation, [4, 8, 8, 5]);
    }

    #[test]
    fn returns_jump_to_epilogue() {
        let program = generate(
            "func int f(bool b) { if (b) { return 1; } else { return 2; } } main { }",
        );
        let jumps = program
            .instructions()
            .iter()
            .filter(|i| i.opcode == OpCode::Jump && i.label() == Some("function-f-epilogue"))
            .count();
        assert_eq!(jumps, 2);
    }

    #[test]
    fn boolean_result_stored_as_byte() {
        let program = generate("func bool t() { return true; } main { }");
        let epilogue = opcodes_after_label(&program, "function-t-epilogue");
        assert_eq!(epilogue.last(), Some(&OpCode::Return));
        assert_eq!(epilogue[epilogue.len() - 2], OpCode::StoreC);
    }

    #[test]
    fn void_epilogue_returns_directly() {
        let program = generate("func void v() { } main { }");
        let epilogue = opcodes_after_label(&program, "function-v-epilogue");
        let subtracts = epilogue.iter().filter(|op| **op == OpCode::Subtract).count();
        assert_eq!(subtracts, 2);
        assert_eq!(&epilogue[epilogue.len() - 2..], [OpCode::StoreI, OpCode::Return]);
    }

    #[test]
    fn function_addresses_stored_in_main() {
        let program = generate("func void v() { } main { call v(); }");
        let position = |predicate: &dyn Fn(&crate::asm::Instruction) -> bool| {
            program.instructions().iter().position(predicate).unwrap()
        };
        let main = position(&|i| i.opcode == OpCode::Label && i.label() == Some("$$main"));
        let store = position(&|i| i.opcode == OpCode::PushD && i.label() == Some("v"));
        let call = position(&|i| i.opcode == OpCode::CallV);
        let halt = position(&|i| i.opcode == OpCode::Halt);
        assert!(main < store && store < call && call < halt);
    }
}
