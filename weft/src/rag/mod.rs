//! Retrieval-augmented generation.
//!
//! [`RagPipeline`] splits and indexes documents, then answers questions from the top-k
//! retrieved chunks. [`rag_chain`] builds the same flow as a runnable:
//! `{context: retriever | format_documents, question: passthrough} | prompt | llm | string`.

use std::sync::Arc;

use serde::Serialize;

use crate::document::Document;
use crate::embeddings::{Embedder, EmbeddingError};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::output_parsers::{OutputParser, StringOutputParser};
use crate::prompts::{PromptError, PromptTemplate, PromptValues};
use crate::runnable::{
    format_documents, ChainError, FormatDocuments, LlmRunnable, ParserRunnable, PromptRunnable,
    RetrieverRunnable, Runnable, RunnableParallel, RunnablePassthrough, RunnableSequence,
};
use crate::text_splitter::{RecursiveCharacterTextSplitter, SplitterError};
use crate::vectorstore::{InMemoryVectorStore, VectorStoreRetriever};

pub const RAG_PROMPT: &str = "Answer the question based only on the following context:\nContext:\n{context}\n\nQuestion:\n{question}\n\nAnswer:";

pub const DEFAULT_CHUNK_SIZE: usize = 300;
pub const DEFAULT_CHUNK_OVERLAP: usize = 0;
pub const DEFAULT_K: usize = 2;

/// Answer plus the chunks it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<Document>,
}

/// Split, index, retrieve, answer.
pub struct RagPipeline {
    store: Arc<InMemoryVectorStore>,
    splitter: RecursiveCharacterTextSplitter,
    llm: Arc<dyn LlmClient>,
    prompt: PromptTemplate,
    k: usize,
}

impl RagPipeline {
    /// Chunk 300, overlap 0, k = 2.
    pub fn new(embedder: Arc<dyn Embedder>, llm: Arc<dyn LlmClient>) -> Result<Self, ChainError> {
        let splitter = RecursiveCharacterTextSplitter::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)?;
        Ok(Self {
            store: Arc::new(InMemoryVectorStore::new(embedder)),
            splitter,
            llm,
            prompt: PromptTemplate::from_template(RAG_PROMPT)?,
            k: DEFAULT_K,
        })
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterError> {
        self.splitter = RecursiveCharacterTextSplitter::new(chunk_size, chunk_overlap)?;
        Ok(self)
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn store(&self) -> &Arc<InMemoryVectorStore> {
        &self.store
    }

    pub fn retriever(&self) -> VectorStoreRetriever {
        self.store.as_retriever(self.k)
    }

    /// Splits and indexes `documents`; returns the number of chunks added.
    pub async fn ingest(&self, documents: &[Document]) -> Result<usize, EmbeddingError> {
        let chunks = self.splitter.split_documents(documents);
        let added = self.store.add_documents(chunks).await?.len();
        tracing::info!(documents = documents.len(), chunks = added, "ingested documents");
        Ok(added)
    }

    pub async fn answer(&self, question: &str) -> Result<String, ChainError> {
        Ok(self.answer_with_sources(question).await?.answer)
    }

    pub async fn answer_with_sources(&self, question: &str) -> Result<RagAnswer, ChainError> {
        let sources = self.retriever().invoke(question).await?;
        let values = PromptValues::new()
            .with("context", format_documents(&sources))
            .with("question", question);
        let prompt = self.prompt.format(&values)?;
        let response = self.llm.invoke(&[Message::user(prompt)]).await?;
        let answer = StringOutputParser.parse(&response.content)?;
        tracing::debug!(question, sources = sources.len(), "answered question");
        Ok(RagAnswer { answer, sources })
    }
}

/// The RAG flow as a runnable over a text question.
pub fn rag_chain(
    retriever: VectorStoreRetriever,
    llm: Arc<dyn LlmClient>,
) -> Result<RunnableSequence, PromptError> {
    let prompt = PromptTemplate::from_template(RAG_PROMPT)?;
    Ok(RunnableParallel::new()
        .with_branch(
            "context",
            RetrieverRunnable::new(retriever).pipe(FormatDocuments),
        )
        .with_branch("question", RunnablePassthrough)
        .pipe(PromptRunnable::text(prompt))
        .pipe(LlmRunnable::new(llm))
        .pipe(ParserRunnable::new(StringOutputParser)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::llm::MockLlm;
    use crate::runnable::RunValue;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(
                "Mitochondria is the powerhouse of the cell.\n\n\
                 Ribosomes build proteins from amino acids.\n\n\
                 The nucleus stores the genetic material of the cell.",
            )
            .with_metadata("source", "biology.docx"),
        ]
    }

    /// **Scenario**: the prompt carries the retrieved context and the question.
    #[tokio::test]
    async fn answer_uses_retrieved_context() {
        let llm = Arc::new(MockLlm::new("Mitochondria."));
        let rag = RagPipeline::new(Arc::new(HashEmbedder::default()), llm.clone())
            .unwrap()
            .with_chunking(60, 0)
            .unwrap();
        assert_eq!(rag.ingest(&corpus()).await.unwrap(), 3);

        let out = rag
            .answer_with_sources("what is the powerhouse of the cell?")
            .await
            .unwrap();
        assert_eq!(out.answer, "Mitochondria.");
        assert_eq!(out.sources.len(), 2);
        assert!(out.sources.iter().all(|d| d.source() == Some("biology.docx")));

        let prompt = llm.calls()[0][0].content().to_string();
        assert!(prompt.starts_with("Answer the question based only on the following context:\nContext:\n"));
        assert!(prompt.contains("Question:\nwhat is the powerhouse of the cell?\n\nAnswer:"));
    }

    /// **Scenario**: the runnable form produces the same prompt shape.
    #[tokio::test]
    async fn chain_form() {
        let store = Arc::new(
            InMemoryVectorStore::from_documents(
                vec![Document::new("mitochondria is the powerhouse of the cell")],
                Arc::new(HashEmbedder::default()),
            )
            .await
            .unwrap(),
        );
        let llm = Arc::new(MockLlm::new("Mitochondria."));
        let chain = rag_chain(store.as_retriever(DEFAULT_K), llm.clone()).unwrap();
        let out = chain
            .invoke(RunValue::from("what is the powerhouse of the cell?"))
            .await
            .unwrap();
        assert_eq!(out, RunValue::from("Mitochondria."));
        assert_eq!(
            llm.calls()[0][0].content(),
            "Answer the question based only on the following context:\nContext:\n\
             mitochondria is the powerhouse of the cell\n\nQuestion:\n\
             what is the powerhouse of the cell?\n\nAnswer:"
        );
    }

    #[test]
    fn invalid_chunking_is_rejected() {
        let rag = RagPipeline::new(Arc::new(HashEmbedder::new(8)), Arc::new(MockLlm::new("x"))).unwrap();
        assert!(rag.with_chunking(10, 20).is_err());
    }
}
