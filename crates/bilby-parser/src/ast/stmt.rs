//! Statement nodes.

use crate::ast::expr::{CallExpr, Expr};
use crate::ast::node::{ErrorNode, Ident, NodeId};
use bilby_core::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `imm x := e;` or `mut x := e;`
    Declaration(&'ast DeclarationStmt<'ast>),
    /// `x := e;`
    Assignment(&'ast AssignmentStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    Return(ReturnStmt<'ast>),
    /// `call f(args);`
    Call(CallStmt<'ast>),
    Print(PrintStmt<'ast>),
    Block(Block<'ast>),
    Error(ErrorNode),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Declaration(s) => s.span,
            Self::Assignment(s) => s.span,
            Self::If(s) => s.span,
            Self::Return(s) => s.span,
            Self::Call(s) => s.span,
            Self::Print(s) => s.span,
            Self::Block(s) => s.span,
            Self::Error(s) => s.span,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Self::Declaration(s) => s.id,
            Self::Assignment(s) => s.id,
            Self::If(s) => s.id,
            Self::Return(s) => s.id,
            Self::Call(s) => s.id,
            Self::Print(s) => s.id,
            Self::Block(s) => s.id,
            Self::Error(s) => s.id,
        }
    }
}

/// `{ statement* }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclarationStmt<'ast> {
    /// `mut` rather than `imm`.
    pub mutable: bool,
    pub name: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentStmt<'ast> {
    pub target: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_block: Block<'ast>,
    pub else_block: Option<Block<'ast>>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallStmt<'ast> {
    pub call: &'ast CallExpr<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintStmt<'ast> {
    pub items: &'ast [PrintItem<'ast>],
    pub span: Span,
    pub id: NodeId,
}

/// One element of a print list. `,` separators produce no item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrintItem<'ast> {
    Expr(&'ast Expr<'ast>),
    /// `\s`
    Space(Span),
    /// `\n`
    Newline(Span),
}
