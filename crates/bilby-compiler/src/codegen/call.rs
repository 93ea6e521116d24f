//! Function invocation.
//!
//! The caller owns argument space: it pushes the arguments, calls, picks
//! up the result and then releases `arguments + result` bytes.

use bilby_parser::ast::CallExpr;

use crate::asm::{Fragment, OpCode, load_opcode, store_opcode};
use crate::runtime::STACK_POINTER;

use super::CodeGenerator;

impl<'a> CodeGenerator<'a> {
    /// Code layout:
    /// ```text
    /// [for each argument, last first: sp -= size; store value at sp]
    /// [callee cell address]
    /// LoadI
    /// CallV
    /// [load result from sp, or PushI 0 for void]
    /// [sp += result size + argument size]
    /// ```
    pub(super) fn generate_call(&mut self, call: &CallExpr<'_>) -> Fragment {
        let callee = self.binding_of(call.callee.id);
        let mut code = Fragment::value();
        let Some(signature) = callee.ty.signature().cloned() else {
            code.add_int(OpCode::PushI, 0);
            return code;
        };

        for (arg, param) in call.args.exprs.iter().zip(&signature.params).rev() {
            code.load_i_from(STACK_POINTER);
            code.add_int(OpCode::PushI, param.size() as i32);
            code.add(OpCode::Subtract);
            code.store_i_to(STACK_POINTER);

            code.load_i_from(STACK_POINTER);
            code.append(self.generate_value(arg));
            code.add(store_opcode(param));
        }

        callee.generate_address(&mut code);
        code.add(OpCode::LoadI);
        code.add(OpCode::CallV);

        let result = &signature.result;
        if result.is_value() {
            code.load_i_from(STACK_POINTER);
            code.add(load_opcode(result));
        } else {
            code.add_int(OpCode::PushI, 0);
        }

        let release = result.size() + signature.argument_size();
        code.load_i_from(STACK_POINTER);
        code.add_int(OpCode::PushI, release as i32);
        code.add(OpCode::Add);
        code.store_i_to(STACK_POINTER);
        code
    }
}
