//! The Bilby lexer.
//!
//! [`Lexer`] turns source text into [`Token`]s, dispatching on the first
//! character of each token. Lexemes are copied into the arena. Invalid input
//! produces an [`TokenKind::Error`] token and records a [`LexError`]; lexing
//! always continues with the next character.

use bumpalo::Bump;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use bilby_core::{LexError, Span};

pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Scan and return the next token. Returns `Eof` forever once input ends.
    pub fn next_token(&mut self) -> Token<'ast> {
        self.skip_trivia();

        if self.cursor.is_eof() {
            return self.make_eof();
        }

        let start = Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        };

        match self.cursor.peek() {
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some(c) if is_ident_start(c) => self.scan_identifier(start),
            Some('#') => self.scan_char(start),
            Some('"') => self.scan_string(start),
            _ => self.scan_punctuator(start),
        }
    }

    // =========================================
    // Helpers
    // =========================================

    /// Skip whitespace and `%` comments. A comment ends at the next `%` or
    /// at the end of the line.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            if !self.cursor.eat('%') {
                return;
            }
            self.cursor.eat_while(|c| c != '%' && c != '\n');
            self.cursor.eat('%');
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    fn span_from(&self, start: Start) -> Span {
        Span::new(start.line, start.col, self.cursor.offset() - start.offset)
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        Token::new(kind, lexeme, self.span_from(start))
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Numbers
    // =========================================

    /// `digits` or `digits.digits(E[+-]?digits)?`.
    fn scan_number(&mut self, start: Start) -> Token<'ast> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let is_float = self.cursor.peek() == Some('.')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit());
        if !is_float {
            if self.cursor.slice_from(start.offset).parse::<i32>().is_err() {
                let span = self.span_from(start);
                return self.make_error(LexError::InvalidNumber {
                    span,
                    detail: "integer literal does not fit in 32 bits".into(),
                });
            }
            return self.make_token(TokenKind::IntLiteral, start);
        }

        self.cursor.advance(); // '.'
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.eat('E') {
            if !self.cursor.eat('+') {
                self.cursor.eat('-');
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                let span = self.span_from(start);
                return self.make_error(LexError::InvalidNumber {
                    span,
                    detail: "expected digits after exponent".into(),
                });
            }
        }

        let finite = self
            .cursor
            .slice_from(start.offset)
            .parse::<f64>()
            .is_ok_and(f64::is_finite);
        if !finite {
            let span = self.span_from(start);
            return self.make_error(LexError::InvalidNumber {
                span,
                detail: "float literal out of range".into(),
            });
        }
        self.make_token(TokenKind::FloatLiteral, start)
    }

    // =========================================
    // Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let text = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Character and string literals
    // =========================================

    /// `#c` is the character `c`, `##d` escapes a digit or `#`, and `#ooo`
    /// is an octal code in the printable range 32..=126.
    fn scan_char(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance(); // '#'

        match self.cursor.peek() {
            None => {
                let span = self.span_from(start);
                self.make_error(LexError::InvalidChar {
                    span,
                    detail: "expected a character after '#'".into(),
                })
            }
            Some(c) if ('0'..='7').contains(&c) => {
                let digits = self.cursor.eat_while(|c| ('0'..='7').contains(&c));
                let printable = u32::from_str_radix(digits, 8).is_ok_and(|code| (32..=126).contains(&code));
                if printable {
                    self.make_token(TokenKind::CharLiteral, start)
                } else {
                    let span = self.span_from(start);
                    self.make_error(LexError::InvalidChar {
                        span,
                        detail: format!("octal code {digits} is not a printable character"),
                    })
                }
            }
            Some('#') => {
                self.cursor.advance();
                match self.cursor.peek() {
                    Some(c) if c.is_ascii_digit() || c == '#' => {
                        self.cursor.advance();
                        self.make_token(TokenKind::CharLiteral, start)
                    }
                    _ => {
                        let span = self.span_from(start);
                        self.make_error(LexError::InvalidChar {
                            span,
                            detail: "'##' must be followed by a digit or '#'".into(),
                        })
                    }
                }
            }
            Some(_) => {
                self.cursor.advance();
                self.make_token(TokenKind::CharLiteral, start)
            }
        }
    }

    /// A string runs to the closing quote and may not span lines.
    fn scan_string(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance(); // opening quote
        self.cursor.eat_while(|c| c != '"' && c != '\n');
        if self.cursor.eat('"') {
            self.make_token(TokenKind::StringLiteral, start)
        } else {
            let span = self.span_from(start);
            self.make_error(LexError::UnterminatedString { span })
        }
    }

    // =========================================
    // Punctuators
    // =========================================

    fn scan_punctuator(&mut self, start: Start) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '>' => TokenKind::Greater,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ':' if self.cursor.eat('=') => TokenKind::Assign,
            '\\' if self.cursor.eat('n') => TokenKind::PrintNewline,
            '\\' if self.cursor.eat('s') => TokenKind::PrintSpace,
            _ => {
                let span = self.span_from(start);
                return self.make_error(LexError::UnexpectedChar { ch: c, span });
            }
        };
        self.make_token(kind, start)
    }
}

#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<TokenKind>, Vec<LexError>) {
        let arena = Bump::new();
        let mut lexer = Lexer::new(source, &arena);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            kinds.push(token.kind);
        }
        (kinds, lexer.take_errors())
    }

    #[test]
    fn declaration() {
        use TokenKind::*;
        let (kinds, errors) = lex("imm x := 3 + y;");
        assert!(errors.is_empty());
        assert_eq!(
            kinds,
            vec![Imm, Identifier, Assign, IntLiteral, Plus, Identifier, Semicolon]
        );
    }

    #[test]
    fn function_header() {
        use TokenKind::*;
        let (kinds, _) = lex("func bool gt(int a, int b) {");
        assert_eq!(
            kinds,
            vec![Func, Bool, Identifier, LeftParen, Int, Identifier, Comma, Int, Identifier, RightParen, LeftBrace]
        );
    }

    #[test]
    fn print_separators() {
        use TokenKind::*;
        let (kinds, errors) = lex(r"print x, \s y \n;");
        assert!(errors.is_empty());
        assert_eq!(
            kinds,
            vec![Print, Identifier, Comma, PrintSpace, Identifier, PrintNewline, Semicolon]
        );
    }

    #[test]
    fn comments_end_at_percent_or_newline() {
        use TokenKind::*;
        let (kinds, _) = lex("imm % inline % x % to end of line\n;");
        assert_eq!(kinds, vec![Imm, Identifier, Semicolon]);
    }

    #[test]
    fn float_literals() {
        let (kinds, errors) = lex("3.25 1.5E-3 2.0E+10 7");
        assert!(errors.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::IntLiteral
            ]
        );
    }

    #[test]
    fn float_with_bad_exponent() {
        let (kinds, errors) = lex("1.0E+");
        assert_eq!(kinds, vec![TokenKind::Error]);
        assert!(matches!(errors[0], LexError::InvalidNumber { .. }));
    }

    #[test]
    fn integer_overflow_is_rejected() {
        let (_, errors) = lex("2147483647 2147483648");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span(), Span::new(1, 12, 10));
    }

    #[test]
    fn character_literals() {
        let (kinds, errors) = lex("#a ##7 ### #101");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(kinds, vec![TokenKind::CharLiteral; 4]);

        let (_, errors) = lex("#7");
        assert!(matches!(errors[0], LexError::InvalidChar { .. }));
        let (_, errors) = lex("##x");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn strings_do_not_span_lines() {
        let (kinds, errors) = lex("\"hello\" \"broken\n\"");
        assert_eq!(kinds[0], TokenKind::StringLiteral);
        assert_eq!(kinds[1], TokenKind::Error);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn unexpected_characters_recover() {
        let (kinds, errors) = lex("x @ : y");
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Error, TokenKind::Error, TokenKind::Identifier]
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            LexError::UnexpectedChar {
                ch: '@',
                span: Span::new(1, 3, 1)
            }
        );
    }

    #[test]
    fn spans_track_lines() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("main {\n  print 1;\n}", &arena);
        let main = lexer.next_token();
        lexer.next_token();
        let print = lexer.next_token();
        assert_eq!(main.span, Span::new(1, 1, 4));
        assert_eq!(print.span, Span::new(2, 3, 5));
        assert_eq!(print.lexeme, "print");
    }
}
