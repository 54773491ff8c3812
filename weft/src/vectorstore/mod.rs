//! In-memory similarity index over documents.
//!
//! Insert-only: records get sequential ids and are never updated or removed. Search
//! ranks by cosine similarity, highest first; equal scores keep insertion order.

mod retriever;

pub use retriever::VectorStoreRetriever;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::document::Document;
use crate::embeddings::{Embedder, EmbeddingError};

/// Document plus its embedding.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Cosine similarity; 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// In-memory vector store. Not persistent.
pub struct InMemoryVectorStore {
    records: DashMap<usize, VectorRecord>,
    next_id: AtomicUsize,
    embedder: Arc<dyn Embedder>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicUsize::new(0),
            embedder,
        }
    }

    /// Builds a store and indexes `documents`.
    pub async fn from_documents(
        documents: Vec<Document>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, EmbeddingError> {
        let store = Self::new(embedder);
        store.add_documents(documents).await?;
        Ok(store)
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Embeds and indexes `documents`. Returns the assigned ids.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<usize>, EmbeddingError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: documents.len(),
                got: vectors.len(),
            });
        }
        let ids = self.add_vectors(vectors, documents);
        tracing::debug!(added = ids.len(), total = self.len(), "indexed documents");
        Ok(ids)
    }

    /// Indexes precomputed vectors. Pairs beyond the shorter list are ignored.
    pub fn add_vectors(&self, vectors: Vec<Vec<f32>>, documents: Vec<Document>) -> Vec<usize> {
        vectors
            .into_iter()
            .zip(documents)
            .map(|(embedding, document)| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.records.insert(
                    id,
                    VectorRecord {
                        document,
                        embedding,
                    },
                );
                id
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Top `k` documents for `query` with their scores.
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, EmbeddingError> {
        let query_vec = self.embedder.embed_query(query).await?;
        Ok(self.similarity_search_by_vector_with_score(&query_vec, k))
    }

    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, EmbeddingError> {
        Ok(self
            .similarity_search_with_score(query, k)
            .await?
            .into_iter()
            .map(|(doc, _)| doc)
            .collect())
    }

    pub fn similarity_search_by_vector(&self, query: &[f32], k: usize) -> Vec<Document> {
        self.similarity_search_by_vector_with_score(query, k)
            .into_iter()
            .map(|(doc, _)| doc)
            .collect()
    }

    fn similarity_search_by_vector_with_score(&self, query: &[f32], k: usize) -> Vec<(Document, f32)> {
        let mut scored: Vec<(usize, f32, Document)> = self
            .records
            .iter()
            .map(|entry| {
                let score = cosine_similarity(query, &entry.value().embedding);
                (*entry.key(), score, entry.value().document.clone())
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(k)
            .map(|(_, score, doc)| (doc, score))
            .collect()
    }

    /// Retriever returning the top `k` documents per query.
    pub fn as_retriever(self: &Arc<Self>, k: usize) -> VectorStoreRetriever {
        VectorStoreRetriever::new(Arc::clone(self), k)
    }
}
