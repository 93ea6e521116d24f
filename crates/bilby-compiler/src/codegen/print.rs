//! Print statement lowering.
//!
//! Each item is printed with its own `Printf`: integers through `%d`,
//! booleans by selecting the `true` or `false` string for `%s`.

use bilby_core::Type;
use bilby_parser::ast::{Expr, PrintItem, PrintStmt};

use crate::asm::{Fragment, OpCode};
use crate::runtime::{
    BOOLEAN_FALSE_STRING, BOOLEAN_PRINT_FORMAT, BOOLEAN_TRUE_STRING, INTEGER_PRINT_FORMAT,
    NEWLINE_PRINT_FORMAT, SPACE_PRINT_FORMAT,
};

use super::CodeGenerator;

impl<'a> CodeGenerator<'a> {
    pub(super) fn generate_print(&mut self, print: &PrintStmt<'_>) -> Fragment {
        let mut code = Fragment::void();
        for item in print.items {
            match item {
                PrintItem::Expr(expr) => code.append(self.generate_print_value(expr)),
                PrintItem::Space(_) => {
                    code.add_label_operand(OpCode::PushD, SPACE_PRINT_FORMAT);
                    code.add(OpCode::Printf);
                }
                PrintItem::Newline(_) => {
                    code.add_label_operand(OpCode::PushD, NEWLINE_PRINT_FORMAT);
                    code.add(OpCode::Printf);
                }
            }
        }
        code
    }

    /// Code layout for a boolean:
    /// ```text
    /// [value]
    /// JumpTrue -print-boolean-n-true
    /// PushD $boolean-false-string
    /// Jump -print-boolean-n-join
    /// Label -print-boolean-n-true
    /// PushD $boolean-true-string
    /// Label -print-boolean-n-join
    /// PushD $print-format-boolean
    /// Printf
    /// ```
    fn generate_print_value(&mut self, expr: &Expr<'_>) -> Fragment {
        let ty = self.type_of(expr.id());
        let mut code = Fragment::void();
        code.append(self.generate_value(expr));

        let format = if ty == Type::Boolean {
            let labels = self.labeller.family("print-boolean");
            let true_label = labels.label("true");
            let join_label = labels.label("join");
            code.add_label_operand(OpCode::JumpTrue, &true_label);
            code.add_label_operand(OpCode::PushD, BOOLEAN_FALSE_STRING);
            code.add_label_operand(OpCode::Jump, &join_label);
            code.label(&true_label);
            code.add_label_operand(OpCode::PushD, BOOLEAN_TRUE_STRING);
            code.label(&join_label);
            BOOLEAN_PRINT_FORMAT
        } else {
            INTEGER_PRINT_FORMAT
        };

        code.add_label_operand(OpCode::PushD, format);
        code.add(OpCode::Printf);
        code
    }
}
