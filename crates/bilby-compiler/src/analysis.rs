//! Results of semantic analysis.
//!
//! The AST is never mutated. Everything the passes learn about a node lives
//! in side tables keyed by [`NodeId`].

use bilby_core::Type;
use bilby_parser::ast::NodeId;
use rustc_hash::FxHashMap;

use crate::binding::Binding;
use crate::scope::{ScopeId, ScopeTree};

#[derive(Debug, Default)]
pub struct Analysis {
    pub scopes: ScopeTree,
    types: FxHashMap<NodeId, Type>,
    bindings: FxHashMap<NodeId, Binding>,
    node_scopes: FxHashMap<NodeId, ScopeId>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    pub fn set_binding(&mut self, node: NodeId, binding: Binding) {
        self.bindings.insert(node, binding);
    }

    pub fn binding_of(&self, node: NodeId) -> Option<&Binding> {
        self.bindings.get(&node)
    }

    /// Record the scope a program, function or block introduces.
    pub fn set_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes.insert(node, scope);
    }

    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Nodes typed `Type::Error`, in id order.
    pub fn error_typed_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .types
            .iter()
            .filter(|(_, ty)| ty.is_error())
            .map(|(id, _)| *id)
            .collect();
        nodes.sort();
        nodes
    }

    pub fn typed_node_count(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_tables() {
        let mut analysis = Analysis::new();
        analysis.set_type(NodeId(3), Type::Error);
        analysis.set_type(NodeId(1), Type::Integer);
        analysis.set_type(NodeId(2), Type::Error);
        analysis.set_binding(NodeId(1), Binding::null());

        assert_eq!(analysis.type_of(NodeId(1)), Some(&Type::Integer));
        assert!(analysis.type_of(NodeId(9)).is_none());
        assert!(analysis.binding_of(NodeId(1)).unwrap().is_null());
        assert_eq!(analysis.error_typed_nodes(), [NodeId(2), NodeId(3)]);
        assert_eq!(analysis.typed_node_count(), 3);
    }

    #[test]
    fn scopes_by_node() {
        let mut analysis = Analysis::new();
        let program = analysis.scopes.create_program_scope();
        analysis.set_scope(NodeId(0), program);
        assert_eq!(analysis.scope_of(NodeId(0)), Some(program));
        assert_eq!(analysis.scope_of(NodeId(1)), None);
    }
}
