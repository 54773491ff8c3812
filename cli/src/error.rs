//! Error type shared by all flows.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Chain(#[from] weft::ChainError),
    #[error(transparent)]
    Prompt(#[from] weft::PromptError),
    #[error("loader: {0}")]
    Loader(#[from] weft::LoaderError),
    #[error("embeddings: {0}")]
    Embedding(#[from] weft::EmbeddingError),
    #[error("splitter: {0}")]
    Splitter(#[from] weft::SplitterError),
    #[error("agent: {0}")]
    Agent(#[from] weft::AgentError),
    #[error("agent: {0}")]
    Build(#[from] weft::BuildAgentError),
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] weft::CheckpointError),
    #[error("{0}")]
    Input(String),
}
