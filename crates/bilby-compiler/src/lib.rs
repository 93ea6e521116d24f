//! Bilby Compiler
//!
//! Semantic analysis and code generation for Bilby programs.
//!
//! ## Architecture
//!
//! - **Pass 1 (Declaration)**: Create the program scope and bind every function signature
//! - **Pass 2 (Check)**: Build function and block scopes, resolve names, type check
//! - **Code generation**: Only when both passes reported nothing
//!
//! ## Modules
//!
//! - [`analysis`]: Side tables of types, bindings and scopes keyed by node id
//! - [`asm`]: Opcodes, instructions, code fragments and whole programs
//! - [`binding`]: Bindings and memory locations
//! - [`codegen`]: Fragment-folding code generator and calling convention
//! - [`labeller`]: Per-compilation unique labels
//! - [`passes`]: Declaration and check passes
//! - [`runtime`]: Runtime environment emitted ahead of every program
//! - [`scope`]: Scope tree and memory allocators
//! - [`signatures`]: Operator signature tables

pub mod analysis;
pub mod asm;
pub mod binding;
pub mod codegen;
mod diagnostics;
pub mod labeller;
pub mod passes;
mod return_checker;
pub mod runtime;
pub mod scope;
pub mod signatures;

pub use analysis::Analysis;
pub use asm::{AsmProgram, Fragment, FragmentKind, Instruction, OpCode, Operand};
pub use binding::{Binding, MemoryBase, MemoryLocation};
pub use codegen::CodeGenerator;
pub use diagnostics::Diagnostics;
pub use labeller::Labeller;
pub use passes::{CheckPass, DeclarationPass};
pub use return_checker::ReturnChecker;
pub use scope::{ScopeId, ScopeKind, ScopeTree};

// Re-export CompilationError from core for convenience
pub use bilby_core::CompilationError;

use bilby_parser::ast::Program;

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Emit the runtime environment and stack initialization. Without it the
    /// output only links against an environment supplied elsewhere.
    pub emit_prelude: bool,
    /// Prepended to every generated label.
    pub label_prefix: String,
    /// Annotate address computations and function entries with `%%` comments.
    pub comments: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            emit_prelude: true,
            label_prefix: String::new(),
            comments: true,
        }
    }
}

/// Result of compilation.
#[derive(Debug)]
pub struct CompilationResult {
    /// Generated assembly; `None` when any diagnostic was reported.
    pub asm: Option<AsmProgram>,
    /// Everything semantic analysis recorded.
    pub analysis: Analysis,
    /// Diagnostics in the order they were reported.
    pub errors: Vec<CompilationError>,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The main compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Run both semantic passes.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(program: &Program<'_>) -> (Analysis, Vec<CompilationError>) {
        let mut analysis = Analysis::new();
        let mut diagnostics = Diagnostics::new();

        let program_scope = DeclarationPass::new(&mut analysis, &mut diagnostics).run(program);
        CheckPass::new(&mut analysis, &mut diagnostics, program_scope).run(program);

        (analysis, diagnostics.into_errors())
    }

    /// Analyze a program and, when it is free of diagnostics, generate code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(program: &Program<'_>, options: &CompileOptions) -> CompilationResult {
        let (analysis, errors) = Self::analyze(program);
        let asm = if errors.is_empty() {
            Some(CodeGenerator::new(&analysis, options).generate(program))
        } else {
            tracing::debug!(errors = errors.len(), "skipping code generation");
            None
        };

        CompilationResult {
            asm,
            analysis,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bilby_core::DiagnosticKind;
    use bilby_parser::Parser;
    use bumpalo::Bump;

    fn compile(source: &str) -> CompilationResult {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        Compiler::compile(&program, &CompileOptions::default())
    }

    #[test]
    fn successful_compilation_produces_code() {
        let result = compile(
            "func int add(int a, int b) { return a + b; } main { imm x := add(2, 3); print x; }",
        );
        assert!(result.is_success());
        let asm = result.asm.unwrap();
        assert!(asm.count(OpCode::CallV) == 1);
        assert!(asm.to_string().contains("Label       add"));
    }

    #[test]
    fn diagnostics_suppress_code() {
        let result = compile("main { mut x := 1; x := true; }");
        assert!(!result.is_success());
        assert!(result.asm.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind(), DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn n_comparisons_give_6n_labels() {
        let n = 5;
        let body: String = (0..n).map(|_| "if (a > b) { print a; } ").collect();
        let result = compile(&format!("main {{ imm a := 2; imm b := 1; {body} }}"));
        let asm = result.asm.unwrap();

        let labels: Vec<&str> = asm.defined_labels().collect();
        let compare = labels.iter().filter(|l| l.contains("-compare-")).count();
        assert_eq!(compare, 6 * n);

        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn analysis_is_returned() {
        let result = compile("main { imm x := 1; }");
        assert_eq!(result.analysis.scopes.entered(), result.analysis.scopes.left());
    }
}
