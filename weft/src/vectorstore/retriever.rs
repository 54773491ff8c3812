//! Retriever over an in-memory vector store.

use std::sync::Arc;

use crate::document::Document;
use crate::embeddings::EmbeddingError;
use crate::vectorstore::InMemoryVectorStore;

/// Returns the top `k` documents for a query.
#[derive(Clone)]
pub struct VectorStoreRetriever {
    store: Arc<InMemoryVectorStore>,
    k: usize,
}

impl VectorStoreRetriever {
    pub fn new(store: Arc<InMemoryVectorStore>, k: usize) -> Self {
        Self { store, k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub async fn invoke(&self, query: &str) -> Result<Vec<Document>, EmbeddingError> {
        let docs = self.store.similarity_search(query, self.k).await?;
        tracing::debug!(query, k = self.k, hits = docs.len(), "retrieved documents");
        Ok(docs)
    }
}
