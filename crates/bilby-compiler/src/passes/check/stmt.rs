//! Statement checking.

use bilby_core::{CompilationError, Type};
use bilby_parser::ast::{
    AssignmentStmt, DeclarationStmt, IfStmt, PrintItem, PrintStmt, ReturnStmt, Stmt,
};

use super::{BlockScope, CheckPass};

impl<'a> CheckPass<'a> {
    pub(super) fn check_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Declaration(decl) => self.check_declaration(decl),
            Stmt::Assignment(assign) => self.check_assignment(assign),
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::Call(call) => {
                self.check_call(call.call);
            }
            Stmt::Print(print) => self.check_print(print),
            Stmt::Block(block) => self.check_block(block, BlockScope::Subscope),
            Stmt::Error(_) => {}
        }
    }

    fn check_declaration(&mut self, decl: &DeclarationStmt<'_>) {
        let mut ty = self.check_expr(decl.value);
        if !ty.is_value() && !ty.is_error() {
            self.diagnostics.report(CompilationError::NotAValue {
                context: format!("declaration of '{}'", decl.name.name),
                found: ty.to_string(),
                span: decl.value.span(),
            });
            ty = Type::Error;
        }
        self.analysis.set_type(decl.id, ty.clone());
        self.bind(&decl.name, ty, decl.mutable);
    }

    fn check_assignment(&mut self, assign: &AssignmentStmt<'_>) {
        let target = self.resolve(&assign.target);
        let value = self.check_expr(assign.value);

        // Unresolved names and bindings from failed declarations are already reported.
        if target.ty.is_error() {
            return;
        }
        if !target.mutable {
            self.diagnostics.report(CompilationError::ImmutableAssignment {
                name: assign.target.name.to_string(),
                span: assign.target.span,
            });
            return;
        }
        if value.is_error() {
            return;
        }
        if value != target.ty {
            self.diagnostics.report(CompilationError::AssignmentMismatch {
                name: assign.target.name.to_string(),
                expected: target.ty.to_string(),
                found: value.to_string(),
                span: assign.value.span(),
            });
        }
    }

    fn check_if(&mut self, if_stmt: &IfStmt<'_>) {
        let condition = self.check_expr(if_stmt.condition);
        if condition != Type::Boolean && !condition.is_error() {
            self.diagnostics.report(CompilationError::ConditionNotBoolean {
                found: condition.to_string(),
                span: if_stmt.condition.span(),
            });
        }

        self.check_block(&if_stmt.then_block, BlockScope::Subscope);
        if let Some(else_block) = &if_stmt.else_block {
            self.check_block(else_block, BlockScope::Subscope);
        }
    }

    fn check_return(&mut self, ret: &ReturnStmt<'_>) {
        let found = match ret.value {
            Some(value) => {
                let ty = self.check_expr(value);
                if !ty.is_value() && !ty.is_error() {
                    self.diagnostics.report(CompilationError::NotAValue {
                        context: "return".to_string(),
                        found: ty.to_string(),
                        span: value.span(),
                    });
                    return;
                }
                ty
            }
            None => Type::Void,
        };

        let Some(function) = &self.function else {
            self.diagnostics
                .report(CompilationError::ReturnOutsideFunction { span: ret.span });
            return;
        };

        if !found.is_error() && found != function.result {
            self.diagnostics.report(CompilationError::ReturnMismatch {
                expected: function.result.to_string(),
                found: found.to_string(),
                span: ret.span,
            });
        }
    }

    fn check_print(&mut self, print: &PrintStmt<'_>) {
        for item in print.items {
            if let PrintItem::Expr(expr) = item {
                let ty = self.check_expr(expr);
                if !ty.is_value() && !ty.is_error() {
                    self.diagnostics.report(CompilationError::NotAValue {
                        context: "print".to_string(),
                        found: ty.to_string(),
                        span: expr.span(),
                    });
                }
            }
        }
    }
}
