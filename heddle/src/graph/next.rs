//! Next-step result from a graph node: follow the edge, jump to a node, or end.

/// Next step after running a node.
///
/// Ignored for nodes with conditional edges: their router decides from the merged state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the node's outgoing edge (END if it has none).
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
