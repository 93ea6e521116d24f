//! Declaration Pass (Pass 1) - Bind every function name in the program scope.
//!
//! Running this before any body is checked lets a function call any other
//! function regardless of definition order.

use bilby_core::Type;
use bilby_parser::ast::{FunctionDef, Program};

use crate::analysis::Analysis;
use crate::binding::Binding;
use crate::diagnostics::Diagnostics;
use crate::scope::ScopeId;

pub struct DeclarationPass<'a> {
    analysis: &'a mut Analysis,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> DeclarationPass<'a> {
    pub fn new(analysis: &'a mut Analysis, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            analysis,
            diagnostics,
        }
    }

    /// Create the program scope and bind each function. Returns the program scope.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> ScopeId {
        let _span = tracing::debug_span!("declaration_pass").entered();

        let scope = self.analysis.scopes.create_program_scope();
        self.analysis.set_scope(program.id, scope);

        for function in program.functions {
            self.declare_function(scope, function);
        }

        tracing::debug!(functions = program.functions.len(), "declared functions");
        scope
    }

    fn declare_function(&mut self, scope: ScopeId, function: &FunctionDef<'_>) {
        let result = function.return_type.kind.to_type();
        self.analysis.set_type(function.return_type.id, result.clone());

        let params: Vec<Type> = function
            .params
            .params
            .iter()
            .map(|param| {
                let ty = param.ty.kind.to_type();
                self.analysis.set_type(param.ty.id, ty.clone());
                ty
            })
            .collect();

        let ty = Type::function(params, result);
        self.analysis.set_type(function.id, ty.clone());
        self.analysis.set_type(function.name.id, ty.clone());

        let binding = match self.analysis.scopes.create_binding(
            scope,
            function.name.name,
            ty,
            false,
            function.name.span,
        ) {
            Ok(binding) => binding,
            Err(error) => {
                self.diagnostics.report(error);
                Binding::null()
            }
        };
        self.analysis.set_binding(function.name.id, binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bilby_core::{CompilationError, FunctionSignature};
    use bilby_parser::Parser;
    use bumpalo::Bump;

    #[test]
    fn binds_signatures_in_program_scope() {
        let arena = Bump::new();
        let program = Parser::parse(
            "func int add(int a, int b) { return a + b; } \
             func void show(bool flag) { print flag; } \
             main { }",
            &arena,
        )
        .unwrap();

        let mut analysis = Analysis::new();
        let mut diagnostics = Diagnostics::new();
        let scope = DeclarationPass::new(&mut analysis, &mut diagnostics).run(&program);

        assert!(diagnostics.is_empty());
        let add = analysis.scopes.lookup(scope, "add").unwrap();
        assert_eq!(
            add.ty.signature(),
            Some(&FunctionSignature::new(
                vec![Type::Integer, Type::Integer],
                Type::Integer
            ))
        );
        assert!(!add.mutable);

        let show = analysis.scopes.lookup(scope, "show").unwrap();
        assert_eq!(show.ty, Type::function(vec![Type::Boolean], Type::Void));
        assert_eq!(show.location.offset, 4);
        assert_eq!(analysis.scopes.allocated_size(scope), 8);
    }

    #[test]
    fn duplicate_function_reported_once() {
        let arena = Bump::new();
        let program = Parser::parse(
            "func int f() { return 1; } func bool f() { return true; } main { }",
            &arena,
        )
        .unwrap();

        let mut analysis = Analysis::new();
        let mut diagnostics = Diagnostics::new();
        let scope = DeclarationPass::new(&mut analysis, &mut diagnostics).run(&program);

        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics.errors()[0],
            CompilationError::Redefinition { name, .. } if name == "f"
        ));
        let kept = analysis.scopes.lookup(scope, "f").unwrap();
        assert_eq!(kept.ty, Type::function(vec![], Type::Integer));
        assert!(
            analysis
                .binding_of(program.functions[1].name.id)
                .unwrap()
                .is_null()
        );
    }
}
