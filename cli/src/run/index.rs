//! `embed` and `rag`: embeddings, indexing and retrieval-augmented answers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use weft::embeddings::{embed_documents, EmbeddingSummary};
use weft::{Document, Embedder, LlmClient, RagAnswer, RagPipeline};

use super::load::loader_for;
use crate::RunError;

/// Shape of an embedded batch plus a short preview of the first vector.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedOutput {
    #[serde(flatten)]
    pub summary: EmbeddingSummary,
    pub preview: Vec<f32>,
}

impl fmt::Display for EmbedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.summary, self.preview)
    }
}

const PREVIEW_LEN: usize = 5;

pub async fn embed(embedder: &dyn Embedder, texts: &[String]) -> Result<EmbedOutput, RunError> {
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let (vectors, summary) = embed_documents(embedder, &refs).await?;
    let preview = vectors
        .first()
        .map(|v| v.iter().take(PREVIEW_LEN).copied().collect())
        .unwrap_or_default();
    Ok(EmbedOutput { summary, preview })
}

/// Loads every source, indexes it and answers `question` with its top-`k` chunks.
pub async fn rag(
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmClient>,
    sources: &[String],
    question: &str,
    k: usize,
    chunk: (usize, usize),
) -> Result<RagAnswer, RunError> {
    if sources.is_empty() {
        return Err(RunError::Input("rag needs at least one --source".into()));
    }
    let mut documents: Vec<Document> = Vec::new();
    for source in sources {
        let loader = loader_for(source)?;
        documents.extend(loader.load().await?);
    }
    let pipeline = RagPipeline::new(embedder, llm)?
        .with_chunking(chunk.0, chunk.1)?
        .with_k(k);
    let chunks = pipeline.ingest(&documents).await?;
    tracing::info!(sources = sources.len(), chunks, "indexed sources");
    Ok(pipeline.answer_with_sources(question).await?)
}
