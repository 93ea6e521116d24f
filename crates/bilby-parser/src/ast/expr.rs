//! Expression nodes.
//!
//! Precedence, lowest first: `>`, then `+`/`-`, then `*`, then unary `-`.
//! Parentheses only group; they leave no node behind.

use crate::ast::node::{ErrorNode, Ident, NodeId};
use crate::ast::{BinaryOp, UnaryOp};
use bilby_core::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Ident(Ident<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    /// Function invocation `f(a, b)`.
    Call(&'ast CallExpr<'ast>),
    Error(ErrorNode),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Error(e) => e.span,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Ident(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Call(e) => e.id,
            Self::Error(e) => e.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Int(i32),
    Bool(bool),
    Char(char),
    Float(f64),
    /// Contents without the surrounding quotes.
    String(&'ast str),
}

impl LiteralKind<'_> {
    /// Name used when the literal kind is rejected.
    pub fn describe(&self) -> &'static str {
        match self {
            LiteralKind::Int(_) => "integer literal",
            LiteralKind::Bool(_) => "boolean literal",
            LiteralKind::Char(_) => "character literal",
            LiteralKind::Float(_) => "float literal",
            LiteralKind::String(_) => "string literal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: Ident<'ast>,
    pub args: ExprList<'ast>,
    pub span: Span,
    pub id: NodeId,
}

/// The argument list of a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprList<'ast> {
    pub exprs: &'ast [&'ast Expr<'ast>],
    pub span: Span,
    pub id: NodeId,
}
