//! Token definitions for the Bilby lexer.

use bilby_core::Span;
use std::fmt;

/// A token with its source text.
///
/// The lexeme lives in the parse arena, so the source string may be dropped
/// once parsing has finished.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`
    IntLiteral,
    /// `3.25`, `1.5E-3`
    FloatLiteral,
    /// `#a`, `##7`, `#101`
    CharLiteral,
    /// `"text"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Main,
    Func,
    Imm,
    Mut,
    Print,
    Call,
    If,
    Else,
    Return,
    Int,
    Bool,
    Void,
    True,
    False,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `>`
    Greater,
    /// `:=`
    Assign,

    // =========================================
    // Delimiters
    // =========================================
    /// `,` between print items
    Comma,
    /// `;`
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    /// `\n` inside a print statement
    PrintNewline,
    /// `\s` inside a print statement
    PrintSpace,

    // =========================================
    // Special
    // =========================================
    Eof,
    /// Produced when the lexer rejects input; the error is recorded separately.
    Error,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Main | Func | Imm | Mut | Print | Call | If | Else | Return | Int | Bool | Void | True
                | False
        )
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IntLiteral | FloatLiteral | CharLiteral | StringLiteral | True | False
        )
    }

    /// Whether this token names one of the primitive types.
    pub fn is_type(self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Bool | TokenKind::Void)
    }

    /// Human readable description for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            CharLiteral => "character literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Main => "'main'",
            Func => "'func'",
            Imm => "'imm'",
            Mut => "'mut'",
            Print => "'print'",
            Call => "'call'",
            If => "'if'",
            Else => "'else'",
            Return => "'return'",
            Int => "'int'",
            Bool => "'bool'",
            Void => "'void'",
            True => "'true'",
            False => "'false'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Greater => "'>'",
            Assign => "':='",
            Comma => "','",
            Semicolon => "';'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            PrintNewline => "'\\n'",
            PrintSpace => "'\\s'",
            Eof => "end of file",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map an identifier-shaped lexeme to its keyword, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "main" => Main,
        "func" => Func,
        "imm" => Imm,
        "mut" => Mut,
        "print" => Print,
        "call" => Call,
        "if" => If,
        "else" => Else,
        "return" => Return,
        "int" => Int,
        "bool" => Bool,
        "void" => Void,
        "true" => True,
        "false" => False,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_through_lookup() {
        for word in [
            "main", "func", "imm", "mut", "print", "call", "if", "else", "return", "int", "bool",
            "void", "true", "false",
        ] {
            let kind = lookup_keyword(word).expect(word);
            assert!(kind.is_keyword(), "{word}");
        }
        assert_eq!(lookup_keyword("mainly"), None);
        assert_eq!(lookup_keyword("Int"), None);
    }

    #[test]
    fn classification() {
        assert!(TokenKind::True.is_literal());
        assert!(TokenKind::CharLiteral.is_literal());
        assert!(!TokenKind::Identifier.is_literal());
        assert!(TokenKind::Void.is_type());
        assert!(!TokenKind::Main.is_type());
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(TokenKind::Assign.to_string(), "':='");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
