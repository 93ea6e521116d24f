//! # Bilby
//!
//! An ahead-of-time compiler from the Bilby language to textual assembly
//! for a stack machine, with a reference emulator for the output.
//!
//! ## Quick Start
//!
//! ```
//! use bilby::Unit;
//!
//! let mut unit = Unit::new();
//! unit.set_source("hello.bilby", "main { print 40 + 2 \\n; }")?;
//! let asm = unit.build()?.to_string();
//! assert!(asm.contains("Halt"));
//! assert_eq!(unit.run()?, "42\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! - [`bilby_core`]: spans, types and error types
//! - [`bilby_parser`]: lexer and parser producing an arena-allocated AST
//! - [`bilby_compiler`]: semantic analysis and code generation
//!
//! This crate adds the [`Unit`] driver, the [`vm`] emulator and the
//! `bilbyc` command-line compiler.

mod unit;
pub mod vm;

pub use unit::{Unit, UnitError};

pub use bilby_compiler::{AsmProgram, CompilationResult, CompileOptions, Compiler, OpCode};
pub use bilby_core::{BilbyError, CompilationError, DiagnosticKind, ParseError, RuntimeError, Span, Type};
pub use bilby_parser::Parser;

pub type Result<T> = std::result::Result<T, BilbyError>;

/// Parse and compile `source`, returning the generated assembly.
///
/// Semantic diagnostics are returned together in [`BilbyError::Compilation`].
pub fn compile(source: &str, options: &CompileOptions) -> Result<AsmProgram> {
    let arena = bumpalo::Bump::new();
    let program = Parser::parse(source, &arena)?;
    let result = Compiler::compile(&program, options);
    match result.asm {
        Some(asm) if result.errors.is_empty() => Ok(asm),
        _ => Err(BilbyError::Compilation(result.errors)),
    }
}
