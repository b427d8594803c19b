//! Graph compilation error.

use thiserror::Error;

/// Returned by `StateGraph::compile()` when the topology is not runnable.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge leaves START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Nothing ever leads to END.
    #[error("graph must have at least one path to END")]
    MissingEnd,

    /// Unconditional edges branch or loop with no way out.
    #[error("invalid edge chain: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A conditional path_map value is not a node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_id() {
        let s = CompilationError::NodeNotFound("x".to_string()).to_string();
        assert!(s.contains("node not found") && s.contains('x'), "{}", s);
        let s = CompilationError::InvalidConditionalPathMap("ghost".into()).to_string();
        assert!(s.contains("ghost"), "{}", s);
    }
}
