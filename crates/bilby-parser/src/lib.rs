//! Lexer and parser for the Bilby language.
//!
//! - [`lexer`]: tokenization of source text
//! - [`ast`]: arena-allocated syntax tree and the recursive-descent [`Parser`]
//!
//! ```
//! use bilby_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! match Parser::parse("main { imm x := 1 + 2; print x \\n; }", &arena) {
//!     Ok(program) => assert_eq!(program.main.stmts.len(), 2),
//!     Err(errors) => panic!("parse errors: {errors}"),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Parser, Program};
pub use bilby_core::Span;
pub use lexer::{Lexer, Token, TokenKind};
