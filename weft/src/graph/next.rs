//! Next-step result from a graph node: continue, jump to a node, or end.

/// Next step after running a node.
///
/// Ignored when the node has conditional edges: the router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the node's outgoing edge; with none, end.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
