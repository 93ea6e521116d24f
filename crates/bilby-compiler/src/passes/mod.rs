//! Semantic passes.
//!
//! - [`declaration`]: Pass 1 - create the program scope and bind every function signature
//! - [`check`]: Pass 2 - resolve names, type check, and build the remaining scopes

pub mod check;
pub mod declaration;

pub use check::CheckPass;
pub use declaration::DeclarationPass;
