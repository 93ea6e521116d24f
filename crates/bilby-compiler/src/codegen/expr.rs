//! Expression code generation.
//!
//! Identifiers produce address fragments; everything else produces value
//! fragments. [`CodeGenerator::generate_value`] inserts the load when a
//! parent needs the value behind an address.

use bilby_parser::ast::{BinaryExpr, BinaryOp, Expr, LiteralExpr, LiteralKind, UnaryExpr, UnaryOp};

use crate::asm::{Fragment, OpCode};

use super::CodeGenerator;

impl<'a> CodeGenerator<'a> {
    pub(super) fn generate_expr(&mut self, expr: &Expr<'_>) -> Fragment {
        match expr {
            Expr::Literal(literal) => generate_literal(literal),
            Expr::Ident(ident) => {
                let mut code = Fragment::address();
                self.binding_of(ident.id).generate_address(&mut code);
                code
            }
            Expr::Binary(binary) => self.generate_binary(binary),
            Expr::Unary(unary) => self.generate_unary(unary),
            Expr::Call(call) => self.generate_call(call),
            Expr::Error(_) => {
                let mut code = Fragment::value();
                code.add_int(OpCode::PushI, 0);
                code
            }
        }
    }

    /// Code for `expr` that leaves its value on the operand stack.
    pub(super) fn generate_value(&mut self, expr: &Expr<'_>) -> Fragment {
        let ty = self.type_of(expr.id());
        let fragment = self.generate_expr(expr);
        let mut code = Fragment::value();
        code.append_value(fragment, &ty);
        code
    }

    fn generate_binary(&mut self, binary: &BinaryExpr<'_>) -> Fragment {
        let opcode = match binary.op {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Subtract,
            BinaryOp::Mul => OpCode::Multiply,
            BinaryOp::Greater => return self.generate_comparison(binary),
        };

        let mut code = Fragment::value();
        code.append(self.generate_value(binary.left));
        code.append(self.generate_value(binary.right));
        code.add(opcode);
        code
    }

    /// Code layout:
    /// ```text
    /// Label -compare-n-arg1
    /// [left]
    /// Label -compare-n-arg2
    /// [right]
    /// Label -compare-n-sub
    /// Subtract
    /// JumpPos -compare-n-true
    /// Jump -compare-n-false
    /// Label -compare-n-true
    /// PushI 1
    /// Jump -compare-n-join
    /// Label -compare-n-false
    /// PushI 0
    /// Jump -compare-n-join
    /// Label -compare-n-join
    /// ```
    fn generate_comparison(&mut self, binary: &BinaryExpr<'_>) -> Fragment {
        let labels = self.labeller.family("compare");
        let true_label = labels.label("true");
        let false_label = labels.label("false");
        let join_label = labels.label("join");

        let mut code = Fragment::value();
        code.label(&labels.label("arg1"));
        code.append(self.generate_value(binary.left));
        code.label(&labels.label("arg2"));
        code.append(self.generate_value(binary.right));
        code.label(&labels.label("sub"));
        code.add(OpCode::Subtract);

        code.add_label_operand(OpCode::JumpPos, &true_label);
        code.add_label_operand(OpCode::Jump, &false_label);
        code.label(&true_label);
        code.add_int(OpCode::PushI, 1);
        code.add_label_operand(OpCode::Jump, &join_label);
        code.label(&false_label);
        code.add_int(OpCode::PushI, 0);
        code.add_label_operand(OpCode::Jump, &join_label);
        code.label(&join_label);
        code
    }

    fn generate_unary(&mut self, unary: &UnaryExpr<'_>) -> Fragment {
        let mut code = Fragment::value();
        code.append(self.generate_value(unary.operand));
        match unary.op {
            UnaryOp::Neg => code.add(OpCode::Negate),
        }
        code
    }
}

fn generate_literal(literal: &LiteralExpr<'_>) -> Fragment {
    let mut code = Fragment::value();
    let value = match literal.kind {
        LiteralKind::Int(value) => value,
        LiteralKind::Bool(value) => i32::from(value),
        LiteralKind::Char(_) | LiteralKind::Float(_) | LiteralKind::String(_) => 0,
    };
    code.add_int(OpCode::PushI, value);
    code
}

#[cfg(test)]
mod tests {
    use crate::asm::OpCode;
    use crate::codegen::tests::{generate, opcodes_after_label};

    #[test]
    fn comparison_uses_six_labels() {
        let program = generate("main { imm b := 3 > 2; }");
        let labels: Vec<&str> = program
            .defined_labels()
            .filter(|l| l.starts_with("-compare-0-"))
            .collect();
        assert_eq!(
            labels,
            [
                "-compare-0-arg1",
                "-compare-0-arg2",
                "-compare-0-sub",
                "-compare-0-true",
                "-compare-0-false",
                "-compare-0-join"
            ]
        );
        assert_eq!(
            opcodes_after_label(&program, "-compare-0-sub"),
            [OpCode::Subtract, OpCode::JumpPos, OpCode::Jump]
        );
        assert_eq!(
            opcodes_after_label(&program, "-compare-0-true"),
            [OpCode::PushI, OpCode::Jump]
        );
    }

    #[test]
    fn operands_left_to_right() {
        let program = generate("main { imm x := 7 - 2 * 3; }");
        let pushes: Vec<i32> = program
            .instructions()
            .iter()
            .skip_while(|i| !(i.opcode == OpCode::Label && i.label() == Some("$$main")))
            .filter(|i| i.opcode == OpCode::PushI)
            .filter_map(|i| i.int())
            .collect();
        // Offset of `x`, then the operands.
        assert_eq!(pushes, [0, 7, 2, 3]);
        let ops: Vec<OpCode> = program.instructions().iter().map(|i| i.opcode).collect();
        let multiply = ops.iter().position(|op| *op == OpCode::Multiply).unwrap();
        assert_eq!(ops[multiply + 1], OpCode::Subtract);
    }

    #[test]
    fn identifiers_are_loaded_by_type() {
        let program = generate("main { imm a := 1; imm b := true; imm c := a; imm d := b; }");
        assert_eq!(program.count(OpCode::LoadC), 1);
    }

    #[test]
    fn negation() {
        let program = generate("main { imm x := -5; }");
        assert_eq!(program.count(OpCode::Negate), 1);
    }
}
