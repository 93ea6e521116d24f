//! Return path verification for non-void functions.
//!
//! [`ReturnChecker`] walks a function body and decides whether every path
//! through it reaches a `return`. A statement always returns when it is a
//! `return`, a block containing such a statement, or an `if` whose branches
//! both always return.

use bilby_parser::ast::{Block, Stmt};

#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnChecker;

impl ReturnChecker {
    pub fn new() -> Self {
        Self
    }

    /// Whether control can never fall off the end of `block`.
    pub fn all_paths_return(&self, block: &Block<'_>) -> bool {
        block.stmts.iter().any(|stmt| self.always_returns(stmt))
    }

    fn always_returns(&self, stmt: &Stmt<'_>) -> bool {
        match stmt {
            Stmt::Return(_) => true,
            Stmt::Block(block) => self.all_paths_return(block),
            Stmt::If(if_stmt) => match &if_stmt.else_block {
                Some(else_block) => {
                    self.all_paths_return(&if_stmt.then_block) && self.all_paths_return(else_block)
                }
                None => false,
            },
            Stmt::Declaration(_)
            | Stmt::Assignment(_)
            | Stmt::Call(_)
            | Stmt::Print(_)
            | Stmt::Error(_) => false,
        }
    }
}
