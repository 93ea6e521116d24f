//! Core types shared by the Bilby parser, compiler and emulator.
//!
//! - [`Span`]: source locations
//! - [`Type`] and [`FunctionSignature`]: the static type model
//! - Error types for each phase, unified under [`BilbyError`]

mod error;
mod span;
mod types;

pub use error::{
    BilbyError, CompilationError, DiagnosticKind, LexError, ParseError, ParseErrorKind, ParseErrors,
    RuntimeError,
};
pub use span::Span;
pub use types::{ADDRESS_SIZE, BOOLEAN_SIZE, FunctionSignature, INTEGER_SIZE, Type};
