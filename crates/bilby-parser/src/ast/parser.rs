//! Parser state and token navigation.
//!
//! The source is tokenized up front; lexer errors become
//! [`ParseErrorKind::InvalidToken`] errors and their tokens are dropped, so
//! the grammar rules never see them.

use bumpalo::Bump;

use crate::ast::node::{ErrorNode, NodeId};
use crate::ast::{ParseError, ParseErrors, Program};
use crate::lexer::{Lexer, Token, TokenKind};
use bilby_core::Span;

/// Recursive-descent parser for Bilby.
///
/// Syntax errors are recorded and the parser resynchronizes at the next
/// `;` or `}`, leaving [`ErrorNode`]s in place of the statements it skipped.
pub struct Parser<'ast> {
    pub(crate) arena: &'ast Bump,
    tokens: Vec<Token<'ast>>,
    position: usize,
    pub(crate) errors: Vec<ParseError>,
    next_id: u32,
}

impl<'ast> Parser<'ast> {
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Error => continue,
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }
        let errors = lexer.take_errors().into_iter().map(ParseError::from).collect();

        Self {
            arena,
            tokens,
            position: 0,
            errors,
            next_id: 0,
        }
    }

    /// Parse a complete program, failing if any syntax error was found.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        let (program, errors) = Self::parse_lenient(source, arena);
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Parse a complete program, returning the recovered tree together with
    /// every error encountered.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_lenient(source: &str, arena: &'ast Bump) -> (Program<'ast>, ParseErrors) {
        let mut parser = Parser::new(source, arena);
        let program = parser.parse_program();
        (program, ParseErrors::from(parser.errors))
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // =========================================
    // Token navigation
    // =========================================

    pub(crate) fn peek(&self) -> &Token<'ast> {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = *self.peek();
        if found.kind == TokenKind::Eof {
            Err(ParseError::unexpected_eof(found.span))
        } else {
            Err(ParseError::expected_token(
                found.span,
                kind.description(),
                found.kind.description(),
            ))
        }
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or_else(|| self.peek().span, |token| token.span)
    }

    // =========================================
    // Node bookkeeping
    // =========================================

    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn node_count(&self) -> u32 {
        self.next_id
    }

    pub(crate) fn error_node(&mut self, span: Span) -> ErrorNode {
        ErrorNode {
            span,
            id: self.next_id(),
        }
    }

    // =========================================
    // Error recovery
    // =========================================

    /// Skip to just past the next `;`, or up to (not past) the next `}`.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Eof | TokenKind::RightBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next `func` or `main` keyword.
    pub(crate) fn synchronize_item(&mut self) {
        while !matches!(
            self.peek().kind,
            TokenKind::Eof | TokenKind::Func | TokenKind::Main
        ) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexer_errors_are_reported_and_skipped() {
        let arena = Bump::new();
        let parser = Parser::new("main { imm x := 1 @ ; }", &arena);
        assert_eq!(parser.errors().len(), 1);
        assert!(parser.tokens.iter().all(|t| t.kind != TokenKind::Error));
    }

    #[test]
    fn peek_past_end_stays_on_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new("main", &arena);
        assert_eq!(parser.advance().kind, TokenKind::Main);
        assert!(parser.is_eof());
        assert_eq!(parser.peek().kind, TokenKind::Eof);
        assert_eq!(parser.advance().kind, TokenKind::Eof);
    }

    #[test]
    fn expect_reports_found_token() {
        let arena = Bump::new();
        let mut parser = Parser::new("main }", &arena);
        parser.advance();
        let err = parser.expect(TokenKind::LeftBrace).unwrap_err();
        assert_eq!(err.kind, crate::ast::ParseErrorKind::ExpectedToken);
        assert_eq!(err.message, "expected '{', found '}'");
    }

    #[test]
    fn synchronize_stops_after_semicolon() {
        let arena = Bump::new();
        let mut parser = Parser::new("a b c ; d", &arena);
        parser.synchronize();
        assert_eq!(parser.peek().lexeme, "d");
    }

    #[test]
    fn synchronize_stops_before_brace() {
        let arena = Bump::new();
        let mut parser = Parser::new("a b } c", &arena);
        parser.synchronize();
        assert!(parser.check(TokenKind::RightBrace));
    }
}
