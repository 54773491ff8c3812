//! Agent execution error types.
//!
//! Returned by graph nodes, the compiled graph run loop and LLM clients.

use thiserror::Error;

use crate::memory::CheckpointError;

/// Agent execution error.
///
/// Returned by `Node::run`, `CompiledStateGraph::invoke` and `LlmClient::invoke`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, prompt could not be formatted).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The routing predicate was asked about a conversation with no messages.
    #[error("conversation has no messages to route on")]
    EmptyConversation,

    /// The run took more node steps than `RunnableConfig::recursion_limit` allows.
    #[error("recursion limit of {0} reached without hitting END")]
    RecursionLimit(usize),

    /// Loading or saving a checkpoint failed.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}
