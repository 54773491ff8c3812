//! Text embedding models.
//!
//! [`Embedder`] turns texts into fixed-length vectors. [`OpenAIEmbedder`] calls any
//! OpenAI-compatible `/embeddings` endpoint; [`HashEmbedder`] is a deterministic offline
//! bag-of-words embedder for demos and tests.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAIEmbedder;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error from an embedding call.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding API error: {0}")]
    Api(String),
    #[error("no embedding returned")]
    EmptyResponse,
    #[error("expected {expected} embeddings, got {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Produces fixed-size float vectors from text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)
    }

    /// Vector dimension produced by `embed`.
    fn dimension(&self) -> usize;
}

/// Shape of an embedded batch: `(count, dimension)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmbeddingSummary {
    pub count: usize,
    pub dimension: usize,
}

impl std::fmt::Display for EmbeddingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.count, self.dimension)
    }
}

/// Embeds `texts` and returns the vectors together with their shape. The dimension is
/// taken from the first vector (0 for an empty batch).
pub async fn embed_documents(
    embedder: &dyn Embedder,
    texts: &[&str],
) -> Result<(Vec<Vec<f32>>, EmbeddingSummary), EmbeddingError> {
    if texts.is_empty() {
        return Ok((
            Vec::new(),
            EmbeddingSummary {
                count: 0,
                dimension: 0,
            },
        ));
    }
    let vectors = embedder.embed(texts).await?;
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: texts.len(),
            got: vectors.len(),
        });
    }
    let summary = EmbeddingSummary {
        count: vectors.len(),
        dimension: vectors.first().map(Vec::len).unwrap_or(0),
    };
    tracing::debug!(count = summary.count, dimension = summary.dimension, "embedded documents");
    Ok((vectors, summary))
}
