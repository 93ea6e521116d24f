//! Function definitions and parameters.

use crate::ast::node::{Ident, NodeId, TypeAnnotation};
use crate::ast::stmt::Block;
use bilby_core::Span;

/// `func <type> <name> ( <params> ) <block>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDef<'ast> {
    pub return_type: TypeAnnotation,
    pub name: Ident<'ast>,
    pub params: ParamList<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamList<'ast> {
    pub params: &'ast [Param<'ast>],
    pub span: Span,
    pub id: NodeId,
}

impl<'ast> ParamList<'ast> {
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// `<type> <name>`; parameter types are `int` or `bool`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub ty: TypeAnnotation,
    pub name: Ident<'ast>,
    pub span: Span,
    pub id: NodeId,
}
