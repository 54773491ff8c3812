//! Composable pipeline steps.
//!
//! A [`Runnable`] maps one [`RunValue`] to another. Steps compose with
//! [`Runnable::pipe`] into a [`RunnableSequence`]; [`RunnableParallel`] fans one input out
//! to named branches and collects a map. Adapters wrap prompts, chat models, parsers and
//! retrievers so a retrieval chain reads
//! `{context: retriever | format, question: passthrough} | prompt | llm | parser`.

mod adapters;
mod combinators;
mod value;

pub use adapters::{
    format_documents, FormatDocuments, LlmRunnable, ParserRunnable, PromptRunnable,
    RetrieverRunnable,
};
pub use combinators::{
    RunnableAssign, RunnableLambda, RunnableParallel, RunnablePassthrough, RunnablePick,
    RunnableSequence,
};
pub use value::RunValue;

use std::sync::Arc;

use async_trait::async_trait;

use crate::embeddings::EmbeddingError;
use crate::error::AgentError;
use crate::output_parsers::ParseError;
use crate::prompts::PromptError;
use crate::text_splitter::SplitterError;

/// Errors raised while running a chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
    #[error("model: {0}")]
    Llm(#[from] AgentError),
    #[error("retrieval: {0}")]
    Retrieval(#[from] EmbeddingError),
    #[error("splitter: {0}")]
    Splitter(#[from] SplitterError),
    #[error("expected {expected} input, got {got}")]
    UnexpectedInput { expected: &'static str, got: &'static str },
    #[error("missing key: {0}")]
    MissingKey(String),
    #[error("{0}")]
    Lambda(String),
}

impl ChainError {
    pub(crate) fn unexpected(expected: &'static str, got: &RunValue) -> Self {
        ChainError::UnexpectedInput {
            expected,
            got: got.kind(),
        }
    }
}

/// Shared, type-erased step.
pub type BoxRunnable = Arc<dyn Runnable>;

/// One pipeline step.
#[async_trait]
pub trait Runnable: Send + Sync {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError>;

    /// Runs all inputs concurrently; results keep input order. Fails on the first error.
    async fn batch(&self, inputs: Vec<RunValue>) -> Result<Vec<RunValue>, ChainError> {
        futures::future::join_all(inputs.into_iter().map(|input| self.invoke(input)))
            .await
            .into_iter()
            .collect()
    }

    /// `self` then `next`.
    fn pipe<R>(self, next: R) -> RunnableSequence
    where
        Self: Sized + 'static,
        R: Runnable + 'static,
    {
        let first: BoxRunnable = Arc::new(self);
        let second: BoxRunnable = Arc::new(next);
        RunnableSequence::new(vec![first, second])
    }
}

#[async_trait]
impl<R: Runnable + ?Sized> Runnable for Arc<R> {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        (**self).invoke(input).await
    }
}
