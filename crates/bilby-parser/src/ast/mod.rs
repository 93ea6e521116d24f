//! Abstract syntax tree for Bilby programs.
//!
//! All nodes are `Copy` and live in a [`bumpalo::Bump`] arena. Every node
//! carries a [`Span`] and a [`NodeId`]; semantic analysis annotates nodes
//! through side tables keyed by id and never mutates the tree.
//!
//! ```
//! use bilby_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = "func int twice(int n) { return n + n; } main { print twice(4); }";
//! let program = Parser::parse(source, &arena).unwrap();
//! assert_eq!(program.functions.len(), 1);
//! ```

pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;

mod decl_parser;
mod expr_parser;
mod parser;
mod stmt_parser;

pub use bilby_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;

use bilby_core::Span;

/// A parsed program: function definitions followed by the `main` block.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    pub functions: &'ast [FunctionDef<'ast>],
    pub main: Block<'ast>,
    pub span: Span,
    pub id: NodeId,
    /// Number of node ids handed out; every id in the tree is below this.
    pub node_count: u32,
}

impl<'ast> Program<'ast> {
    pub fn span(&self) -> Span {
        self.span
    }

    /// Look up a function definition by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDef<'ast>> {
        self.functions.iter().find(|f| f.name.name == name)
    }
}
