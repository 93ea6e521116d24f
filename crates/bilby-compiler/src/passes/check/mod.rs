//! Check Pass (Pass 2) - Resolve names and type check every statement.
//!
//! The pass walks the program with an explicit context: the current scope and
//! the function being checked, if any. Scopes are created on the way down and
//! left on the way back up:
//!
//! ```text
//! program scope
//! ├── parameter scope (per function)
//! │   └── procedure scope (function body)
//! │       └── subscope (nested blocks)
//! └── subscope (main block)
//!     └── subscope (nested blocks)
//! ```
//!
//! Problems are reported to the diagnostics sink and the offending node is
//! typed `Type::Error`, which silences follow-on errors from its parents.

mod expr;
mod stmt;

use bilby_core::{CompilationError, Type};
use bilby_parser::ast::{Block, FunctionDef, Ident, Program};

use crate::analysis::Analysis;
use crate::binding::Binding;
use crate::diagnostics::Diagnostics;
use crate::return_checker::ReturnChecker;
use crate::scope::ScopeId;

/// The function whose body is being checked.
#[derive(Debug, Clone)]
struct FunctionContext {
    result: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockScope {
    Procedure,
    Subscope,
}

pub struct CheckPass<'a> {
    analysis: &'a mut Analysis,
    diagnostics: &'a mut Diagnostics,
    program_scope: ScopeId,
    scope: ScopeId,
    function: Option<FunctionContext>,
    return_checker: ReturnChecker,
}

impl<'a> CheckPass<'a> {
    /// `program_scope` is the scope the declaration pass created.
    pub fn new(
        analysis: &'a mut Analysis,
        diagnostics: &'a mut Diagnostics,
        program_scope: ScopeId,
    ) -> Self {
        Self {
            analysis,
            diagnostics,
            program_scope,
            scope: program_scope,
            function: None,
            return_checker: ReturnChecker::new(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) {
        let _span = tracing::debug_span!("check_pass").entered();

        for function in program.functions {
            self.check_function(function);
        }
        self.check_block(&program.main, BlockScope::Subscope);
        self.analysis.scopes.leave(self.program_scope);

        tracing::debug!(
            scopes = self.analysis.scopes.len(),
            diagnostics = self.diagnostics.len(),
            "checked program"
        );
    }

    fn check_function(&mut self, function: &FunctionDef<'_>) {
        let result = function.return_type.kind.to_type();
        let parameters = self.analysis.scopes.create_parameter_scope(self.program_scope);
        self.analysis.set_scope(function.id, parameters);
        self.analysis.set_scope(function.params.id, parameters);
        self.scope = parameters;

        for param in function.params.params {
            let ty = param.ty.kind.to_type();
            self.analysis.set_type(param.id, ty.clone());
            self.bind(&param.name, ty, false);
        }

        let outer = self.function.replace(FunctionContext {
            result: result.clone(),
        });
        self.check_block(&function.body, BlockScope::Procedure);
        self.function = outer;

        self.analysis.scopes.leave(parameters);
        self.scope = self.program_scope;

        if result != Type::Void && !self.return_checker.all_paths_return(&function.body) {
            self.diagnostics.report(CompilationError::MissingReturn {
                name: function.name.name.to_string(),
                expected: result.to_string(),
                span: function.name.span,
            });
        }
    }

    fn check_block(&mut self, block: &Block<'_>, kind: BlockScope) {
        let parent = self.scope;
        let scope = match kind {
            BlockScope::Procedure => self.analysis.scopes.create_procedure_scope(parent),
            BlockScope::Subscope => self.analysis.scopes.create_subscope(parent),
        };
        self.analysis.set_scope(block.id, scope);
        self.scope = scope;

        for stmt in block.stmts {
            self.check_stmt(stmt);
        }

        self.analysis.scopes.leave(scope);
        self.scope = parent;
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Bind a declared name in the current scope.
    fn bind(&mut self, ident: &Ident<'_>, ty: Type, mutable: bool) -> Binding {
        let binding = match self.analysis.scopes.create_binding(
            self.scope,
            ident.name,
            ty.clone(),
            mutable,
            ident.span,
        ) {
            Ok(binding) => binding,
            Err(error) => {
                self.diagnostics.report(error);
                Binding::null()
            }
        };
        self.analysis.set_type(ident.id, ty);
        self.analysis.set_binding(ident.id, binding.clone());
        binding
    }

    /// Resolve a used name through the scope chain.
    fn resolve(&mut self, ident: &Ident<'_>) -> Binding {
        let binding = match self.analysis.scopes.lookup(self.scope, ident.name) {
            Some(binding) => binding.clone(),
            None => {
                self.diagnostics.report(CompilationError::UseBeforeDefine {
                    name: ident.name.to_string(),
                    span: ident.span,
                });
                Binding::null()
            }
        };
        self.analysis.set_type(ident.id, binding.ty.clone());
        self.analysis.set_binding(ident.id, binding.clone());
        binding
    }
}

/// `int, bool` for diagnostics.
fn type_list(types: &[Type]) -> String {
    types
        .iter()
        .map(Type::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
