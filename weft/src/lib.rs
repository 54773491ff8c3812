//! # Weft
//!
//! LLM orchestration in Rust: load documents, split and embed them, search them, format
//! prompts, parse model output, compose pipelines, and run a tool-calling agent whose
//! conversation is checkpointed per thread.
//!
//! ## Main modules
//!
//! - [`loaders`]: [`DocumentLoader`] for text, CSV, JSON, DOCX, web pages, YouTube transcripts
//!   and GitHub repositories; [`load_safely`] for `{ success, error }` reports.
//! - [`text_splitter`]: [`RecursiveCharacterTextSplitter`].
//! - [`embeddings`]: [`Embedder`], [`OpenAIEmbedder`], [`HashEmbedder`].
//! - [`vectorstore`]: [`InMemoryVectorStore`] and its [`VectorStoreRetriever`].
//! - [`prompts`]: [`PromptTemplate`], [`ChatPromptTemplate`], [`MessagesPlaceholder`].
//! - [`output_parsers`]: string, comma-separated list, JSON and structured parsers.
//! - [`runnable`]: [`Runnable`] steps, sequences, parallel maps and adapters.
//! - [`rag`]: [`RagPipeline`] and [`rag_chain`].
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`], [`probe_models`].
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`].
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`], [`RunnableConfig`].
//! - [`agent`]: [`tools_condition`], [`AgentNode`], [`ToolNode`], [`build_tool_agent`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], [`VectorLookupTool`].
//! - [`provider`]: chat and embedding clients for OpenAI, Groq, Mistral, Gemini and Cohere.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use weft::{Document, HashEmbedder, MockLlm, RagPipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rag = RagPipeline::new(
//!     Arc::new(HashEmbedder::default()),
//!     Arc::new(MockLlm::new("Paris")),
//! )?;
//! rag.ingest(&[Document::new("The capital of France is Paris.")]).await?;
//! println!("{}", rag.answer("What is the capital of France?").await?);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod channels;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod graph;
pub mod llm;
pub mod loaders;
pub mod memory;
pub mod message;
pub mod output_parsers;
pub mod prompts;
pub mod provider;
pub mod rag;
pub mod runnable;
pub mod state;
pub mod text_splitter;
pub mod tools;
pub mod vectorstore;

#[cfg(test)]
mod test_support;

pub use agent::{
    build_tool_agent, tools_condition, AgentNode, BuildAgentError, Route, ToolAgent, ToolNode,
};
pub use channels::StateUpdater;
pub use document::{Document, Metadata};
pub use embeddings::{Embedder, EmbeddingError, HashEmbedder, OpenAIEmbedder};
pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
pub use llm::{probe_models, ChatOpenAI, LlmClient, LlmResponse, MockLlm, ProbeOutcome};
pub use loaders::{load_safely, DocumentLoader, LoadReport, LoaderError};
pub use memory::{
    CheckpointError, Checkpointer, JsonSerializer, MemorySaver, RunnableConfig, SqliteSaver,
};
pub use message::{Message, ToolCall};
pub use output_parsers::{OutputParser, ParseError, StringOutputParser};
pub use prompts::{ChatPromptTemplate, MessagesPlaceholder, PromptError, PromptTemplate, PromptValues};
pub use rag::{rag_chain, RagAnswer, RagPipeline};
pub use runnable::{ChainError, RunValue, Runnable, RunnableSequence};
pub use state::{MessagesState, MessagesUpdater};
pub use text_splitter::{RecursiveCharacterTextSplitter, SplitterError};
pub use tools::{Tool, ToolRegistry, ToolSpec, VectorLookupTool};
pub use vectorstore::{InMemoryVectorStore, VectorStoreRetriever};
