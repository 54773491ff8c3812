//! Demo flows behind the `weft` binary.
//!
//! Each flow takes its model and embedder as trait objects so the binary can wire real
//! providers while tests pass `MockLlm` and `HashEmbedder`.

mod error;
mod run;

pub use error::RunError;
pub use run::{
    agent, batch, chat, embed, load, loader_for, parse, probe, rag, sample_employees,
    AgentOptions, EmbedOutput, LoadKind, ParseKind, Recipe, DEFAULT_PROBE_INPUT,
    EXTRACT_TEMPLATE,
};
