//! Leaf nodes shared by expressions, statements and declarations.

use bilby_core::{Span, Type};
use std::fmt;

/// Identity of an AST node.
///
/// Ids are dense and assigned in parse order, so later phases can keep
/// per-node information in side tables instead of mutating the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A name, either where it is declared or where it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
    pub id: NodeId,
}

/// The type keywords of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Bool,
    Void,
}

impl PrimitiveType {
    /// The semantic type this keyword denotes.
    pub fn to_type(self) -> Type {
        match self {
            PrimitiveType::Int => Type::Integer,
            PrimitiveType::Bool => Type::Boolean,
            PrimitiveType::Void => Type::Void,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Void => "void",
        })
    }
}

/// A type annotation as written in a function header or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub kind: PrimitiveType,
    pub span: Span,
    pub id: NodeId,
}

/// Placeholder for a construct that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNode {
    pub span: Span,
    pub id: NodeId,
}
