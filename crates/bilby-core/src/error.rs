//! Error types for every phase of the Bilby pipeline.
//!
//! ```text
//! BilbyError
//! ├── LexError          - tokenization errors
//! ├── ParseErrors       - syntax errors (with recovery)
//! ├── CompilationError  - semantic diagnostics (scopes, types, mutability)
//! ├── RuntimeError      - faults raised by the reference emulator
//! └── Io                - reading sources / writing assembly
//! ```
//!
//! Phase errors can be matched on directly, or converted into
//! [`BilbyError`] with `?`.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string literal hit a newline or end of input before its closing quote.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A `#` character literal without a valid character after it.
    #[error("invalid character literal at {span}: {detail}")]
    InvalidChar { span: Span, detail: String },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::InvalidChar { span, .. } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// A token that cannot start or continue the current construct.
    UnexpectedToken,
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    ExpectedExpression,
    ExpectedIdentifier,
    /// `int`, `bool` or `void` was expected.
    ExpectedType,
    ExpectedStatement,
    ExpectedBlock,
    /// The lexer rejected part of the input.
    InvalidToken,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedBlock => "expected block",
            ParseErrorKind::InvalidToken => "invalid token",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at {span}: {kind}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected {token}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("expected int, bool or void, found {found}"),
        )
    }

    /// Render the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!("error at {}: {}\n", self.span, self.message);
        let line_text = (self.span.line as usize)
            .checked_sub(1)
            .and_then(|idx| source.lines().nth(idx));
        if let Some(text) = line_text {
            let indent = " ".repeat(self.span.col.saturating_sub(1) as usize);
            let underline = "~".repeat(self.span.len.saturating_sub(1) as usize);
            output.push_str("    |\n");
            output.push_str(&format!("{:>3} | {}\n", self.span.line, text));
            output.push_str(&format!("    | {indent}^{underline}\n"));
        }
        output
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::InvalidToken, err.span(), err.to_string())
    }
}

/// All syntax errors collected while parsing one source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl From<Vec<ParseError>> for ParseErrors {
    fn from(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Broad classification of semantic diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A name declared twice in the same scope.
    Redefinition,
    /// A name used with no visible binding.
    UseBeforeDefine,
    TypeMismatch,
    /// Assignment to an `imm` variable or a parameter.
    ImmutabilityViolation,
    /// A statement that is not allowed where it appears.
    MisplacedStatement,
    /// A non-void function whose body can finish without returning.
    MissingReturn,
    /// A construct the language reserves but the compiler does not implement.
    Unsupported,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Redefinition => "redefinition",
            DiagnosticKind::UseBeforeDefine => "use before define",
            DiagnosticKind::TypeMismatch => "type mismatch",
            DiagnosticKind::ImmutabilityViolation => "immutability violation",
            DiagnosticKind::MisplacedStatement => "misplaced statement",
            DiagnosticKind::MissingReturn => "missing return",
            DiagnosticKind::Unsupported => "unsupported",
        })
    }
}

/// A semantic diagnostic produced by the declaration or check pass.
///
/// Diagnostics never abort analysis; the node that caused one is typed
/// `Type::Error` and checking continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error("at {span}: '{name}' is already defined in this scope")]
    Redefinition { name: String, span: Span },

    #[error("at {span}: '{name}' is used before it is defined")]
    UseBeforeDefine { name: String, span: Span },

    /// No signature of an operator accepts the operand types.
    #[error("at {span}: operator '{operator}' not defined for operand types ({operands})")]
    NoMatchingOperator {
        operator: String,
        operands: String,
        span: Span,
    },

    #[error("at {span}: cannot assign a value of type {found} to '{name}' of type {expected}")]
    AssignmentMismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: function returns {expected} but this returns {found}")]
    ReturnMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: '{name}' expects {expected}, called with ({found})")]
    ArgumentMismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: '{name}' has type {found} and cannot be called")]
    NotCallable {
        name: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: if condition must be bool, found {found}")]
    ConditionNotBoolean { found: String, span: Span },

    /// A void or function-typed expression used where a value is required.
    #[error("at {span}: {context} requires an int or bool value, found {found}")]
    NotAValue {
        context: String,
        found: String,
        span: Span,
    },

    #[error("at {span}: cannot assign to immutable '{name}'")]
    ImmutableAssignment { name: String, span: Span },

    #[error("at {span}: return is only allowed inside a function")]
    ReturnOutsideFunction { span: Span },

    #[error("at {span}: function '{name}' may finish without returning a {expected}")]
    MissingReturn {
        name: String,
        expected: String,
        span: Span,
    },

    #[error("at {span}: {what} is not supported")]
    Unsupported { what: String, span: Span },
}

impl CompilationError {
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Redefinition { span, .. }
            | CompilationError::UseBeforeDefine { span, .. }
            | CompilationError::NoMatchingOperator { span, .. }
            | CompilationError::AssignmentMismatch { span, .. }
            | CompilationError::ReturnMismatch { span, .. }
            | CompilationError::ArgumentMismatch { span, .. }
            | CompilationError::NotCallable { span, .. }
            | CompilationError::ConditionNotBoolean { span, .. }
            | CompilationError::NotAValue { span, .. }
            | CompilationError::ImmutableAssignment { span, .. }
            | CompilationError::ReturnOutsideFunction { span }
            | CompilationError::MissingReturn { span, .. }
            | CompilationError::Unsupported { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CompilationError::Redefinition { .. } => DiagnosticKind::Redefinition,
            CompilationError::UseBeforeDefine { .. } => DiagnosticKind::UseBeforeDefine,
            CompilationError::NoMatchingOperator { .. }
            | CompilationError::AssignmentMismatch { .. }
            | CompilationError::ReturnMismatch { .. }
            | CompilationError::ArgumentMismatch { .. }
            | CompilationError::NotCallable { .. }
            | CompilationError::ConditionNotBoolean { .. }
            | CompilationError::NotAValue { .. } => DiagnosticKind::TypeMismatch,
            CompilationError::ImmutableAssignment { .. } => DiagnosticKind::ImmutabilityViolation,
            CompilationError::ReturnOutsideFunction { .. } => DiagnosticKind::MisplacedStatement,
            CompilationError::MissingReturn { .. } => DiagnosticKind::MissingReturn,
            CompilationError::Unsupported { .. } => DiagnosticKind::Unsupported,
        }
    }
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Faults raised while the emulator executes generated assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("operand stack underflow at instruction {pc}")]
    StackUnderflow { pc: usize },

    #[error("memory access out of bounds at address {address} (instruction {pc})")]
    BadAddress { address: i64, pc: usize },

    #[error("unknown label '{label}'")]
    UnknownLabel { label: String },

    #[error("label '{label}' is defined more than once")]
    DuplicateLabel { label: String },

    /// Control transferred to something that is not an instruction index.
    #[error("jump to invalid code address {target} (instruction {pc})")]
    BadJumpTarget { target: i32, pc: usize },

    #[error("unsupported printf format '{format}'")]
    BadFormat { format: String },

    #[error("data segment of {required} bytes exceeds memory of {available} bytes")]
    OutOfMemory { required: usize, available: usize },

    #[error("execution did not halt within {limit} steps")]
    StepLimitExceeded { limit: u64 },

    #[error("execution ran past the last instruction")]
    RanOffEnd,
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Any error the Bilby toolchain can produce.
#[derive(Debug, Error)]
pub enum BilbyError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseErrors),

    #[error("compilation failed with {} error(s)", .0.len())]
    Compilation(Vec<CompilationError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BilbyError {
    pub fn is_parse(&self) -> bool {
        matches!(self, BilbyError::Lex(_) | BilbyError::Parse(_))
    }

    pub fn is_compilation(&self) -> bool {
        matches!(self, BilbyError::Compilation(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, BilbyError::Runtime(_))
    }
}

impl From<Vec<CompilationError>> for BilbyError {
    fn from(errors: Vec<CompilationError>) -> Self {
        BilbyError::Compilation(errors)
    }
}

impl From<CompilationError> for BilbyError {
    fn from(error: CompilationError) -> Self {
        BilbyError::Compilation(vec![error])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::UnexpectedChar {
            ch: '@',
            span: Span::new(2, 4, 1),
        };
        assert_eq!(err.to_string(), "unexpected character '@' at 2:4");
        assert_eq!(err.span(), Span::new(2, 4, 1));
    }

    #[test]
    fn lex_error_becomes_invalid_token() {
        let err: ParseError = LexError::UnterminatedString {
            span: Span::new(1, 9, 4),
        }
        .into();
        assert_eq!(err.kind, ParseErrorKind::InvalidToken);
        assert_eq!(err.span, Span::new(1, 9, 4));
    }

    #[test]
    fn parse_error_with_source() {
        let source = "main {\n  imm x := ;\n}";
        let err = ParseError::expected_expression(Span::new(2, 12, 1), "';'");
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("error at 2:12"));
        assert!(rendered.contains("  2 |   imm x := ;"));
        assert!(rendered.contains("^"));
    }

    #[test]
    fn parse_errors_display_each_line() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::unexpected_eof(Span::point(3, 1)));
        errors.push(ParseError::expected_type(Span::new(1, 6, 3), "'foo'"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string().lines().count(), 2);
    }

    #[test]
    fn compilation_error_kinds() {
        let span = Span::new(1, 1, 1);
        let redefinition = CompilationError::Redefinition {
            name: "x".into(),
            span,
        };
        assert_eq!(redefinition.kind(), DiagnosticKind::Redefinition);

        let mismatch = CompilationError::AssignmentMismatch {
            name: "x".into(),
            expected: "int".into(),
            found: "bool".into(),
            span,
        };
        assert_eq!(mismatch.kind(), DiagnosticKind::TypeMismatch);
        assert_eq!(
            mismatch.to_string(),
            "at 1:1: cannot assign a value of type bool to 'x' of type int"
        );

        let immutable = CompilationError::ImmutableAssignment {
            name: "y".into(),
            span,
        };
        assert_eq!(immutable.kind(), DiagnosticKind::ImmutabilityViolation);
        assert_eq!(
            CompilationError::ReturnOutsideFunction { span }.kind(),
            DiagnosticKind::MisplacedStatement
        );
    }

    #[test]
    fn unified_error_conversions() {
        let err: BilbyError = RuntimeError::RanOffEnd.into();
        assert!(err.is_runtime());

        let err: BilbyError = vec![CompilationError::UseBeforeDefine {
            name: "z".into(),
            span: Span::point(1, 1),
        }]
        .into();
        assert!(err.is_compilation());
        assert_eq!(err.to_string(), "compilation failed with 1 error(s)");

        let err: BilbyError = ParseErrors::from(vec![ParseError::unexpected_eof(Span::point(1, 1))]).into();
        assert!(err.is_parse());
    }
}
