//! Operators and their binding powers.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `>`
    Greater,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
}

impl BinaryOp {
    pub fn from_token(token: TokenKind) -> Option<Self> {
        Some(match token {
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            _ => return None,
        })
    }

    /// Left and right binding power for the Pratt loop. All operators are
    /// left-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        match self {
            BinaryOp::Greater => (1, 2),
            BinaryOp::Add | BinaryOp::Sub => (3, 4),
            BinaryOp::Mul => (5, 6),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Greater => ">",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
}

impl UnaryOp {
    /// Binds tighter than every binary operator.
    pub fn binding_power() -> u8 {
        7
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        match token {
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
