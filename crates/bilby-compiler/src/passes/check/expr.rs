//! Expression typing.
//!
//! Every expression node gets a type in the analysis. An operand typed
//! `Type::Error` makes its parent `Type::Error` without a new diagnostic.

use bilby_core::{CompilationError, Type};
use bilby_parser::ast::{BinaryExpr, CallExpr, Expr, LiteralExpr, LiteralKind, UnaryExpr};

use super::{CheckPass, type_list};
use crate::signatures;

impl<'a> CheckPass<'a> {
    pub(super) fn check_expr(&mut self, expr: &Expr<'_>) -> Type {
        let ty = match expr {
            Expr::Literal(literal) => self.check_literal(literal),
            Expr::Ident(ident) => self.resolve(ident).ty,
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Call(call) => self.check_call(call),
            Expr::Error(_) => Type::Error,
        };
        self.analysis.set_type(expr.id(), ty.clone());
        ty
    }

    fn check_literal(&mut self, literal: &LiteralExpr<'_>) -> Type {
        match literal.kind {
            LiteralKind::Int(_) => Type::Integer,
            LiteralKind::Bool(_) => Type::Boolean,
            LiteralKind::Char(_) | LiteralKind::Float(_) | LiteralKind::String(_) => {
                self.diagnostics.report(CompilationError::Unsupported {
                    what: literal.kind.describe().to_string(),
                    span: literal.span,
                });
                Type::Error
            }
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr<'_>) -> Type {
        let left = self.check_expr(binary.left);
        let right = self.check_expr(binary.right);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }

        match signatures::resolve_binary(binary.op, &left, &right) {
            Some(result) => result,
            None => {
                self.diagnostics.report(CompilationError::NoMatchingOperator {
                    operator: binary.op.as_str().to_string(),
                    operands: type_list(&[left, right]),
                    span: binary.span,
                });
                Type::Error
            }
        }
    }

    fn check_unary(&mut self, unary: &UnaryExpr<'_>) -> Type {
        let operand = self.check_expr(unary.operand);
        if operand.is_error() {
            return Type::Error;
        }

        match signatures::resolve_unary(unary.op, &operand) {
            Some(result) => result,
            None => {
                self.diagnostics.report(CompilationError::NoMatchingOperator {
                    operator: unary.op.as_str().to_string(),
                    operands: operand.to_string(),
                    span: unary.span,
                });
                Type::Error
            }
        }
    }

    /// Type a call. The result may be `Type::Void`; callers that need a
    /// value check for that themselves.
    pub(super) fn check_call(&mut self, call: &CallExpr<'_>) -> Type {
        let callee = self.resolve(&call.callee);
        let args: Vec<Type> = call
            .args
            .exprs
            .iter()
            .map(|arg| self.check_expr(arg))
            .collect();

        let ty = self.call_result(call, &callee.ty, &args);
        self.analysis.set_type(call.id, ty.clone());
        ty
    }

    fn call_result(&mut self, call: &CallExpr<'_>, callee: &Type, args: &[Type]) -> Type {
        if callee.is_error() || args.iter().any(Type::is_error) {
            return Type::Error;
        }

        let Some(signature) = callee.signature() else {
            self.diagnostics.report(CompilationError::NotCallable {
                name: call.callee.name.to_string(),
                found: callee.to_string(),
                span: call.callee.span,
            });
            return Type::Error;
        };

        if !signature.accepts(args) {
            self.diagnostics.report(CompilationError::ArgumentMismatch {
                name: call.callee.name.to_string(),
                expected: format!("({})", type_list(&signature.params)),
                found: type_list(args),
                span: call.args.span,
            });
            return Type::Error;
        }

        signature.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{analyze, kinds};
    use bilby_core::{CompilationError, DiagnosticKind};

    #[test]
    fn arithmetic_and_comparison() {
        assert!(kinds("main { imm a := 1 + 2 * -3; imm b := a > 4; print a, b; }").is_empty());
    }

    #[test]
    fn operator_mismatch_reported_once() {
        let (_, errors) = analyze("main { imm x := (true + 1) * 2 > 3; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            CompilationError::NoMatchingOperator { operator, operands, .. }
                if operator == "+" && operands == "bool, int"
        ));
    }

    #[test]
    fn negating_a_boolean() {
        assert_eq!(kinds("main { imm x := -true; }"), [DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn chained_comparison_is_rejected() {
        assert_eq!(kinds("main { imm x := 3 > 2 > 1; }"), [DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn undefined_name_poisons_expression() {
        let (analysis, errors) = analyze("main { imm x := y + 1; print x; }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), DiagnosticKind::UseBeforeDefine);
        assert!(!analysis.error_typed_nodes().is_empty());
    }

    #[test]
    fn calls_check_arity_and_types() {
        let defs = "func int add(int a, int b) { return a + b; }";
        assert!(kinds(&format!("{defs} main {{ print add(1, 2); }}")).is_empty());

        let (_, errors) = analyze(&format!("{defs} main {{ print add(1, true); }}"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            CompilationError::ArgumentMismatch { name, expected, found, .. }
                if name == "add" && expected == "(int, int)" && found == "int, bool"
        ));

        assert_eq!(
            kinds(&format!("{defs} main {{ print add(1); }}")),
            [DiagnosticKind::TypeMismatch]
        );
    }

    #[test]
    fn calling_a_variable() {
        let (_, errors) = analyze("main { imm x := 1; print x(); }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], CompilationError::NotCallable { name, .. } if name == "x"));
    }

    #[test]
    fn unsupported_literals() {
        for source in [
            "main { imm c := #a; }",
            "main { imm f := 1.5; }",
            "main { print \"hi\"; }",
        ] {
            assert_eq!(kinds(source), [DiagnosticKind::Unsupported], "{source}");
        }
    }
}
