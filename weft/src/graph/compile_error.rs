//! Graph compilation error, returned by `StateGraph::compile`.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Neither a plain edge nor a conditional path reaches END.
    #[error("graph must have an edge to END")]
    MissingEnd,

    /// Edges branch or loop without a conditional edge.
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display carries the offending id or reason.
    #[test]
    fn compilation_error_display() {
        assert!(CompilationError::NodeNotFound("x".into())
            .to_string()
            .contains("node not found: x"));
        assert!(CompilationError::MissingStart.to_string().contains("START"));
        assert!(CompilationError::MissingEnd.to_string().contains("END"));
        assert!(CompilationError::InvalidChain("cycle detected".into())
            .to_string()
            .contains("cycle detected"));
        assert!(CompilationError::InvalidConditionalPathMap("nowhere".into())
            .to_string()
            .contains("nowhere"));
    }
}
