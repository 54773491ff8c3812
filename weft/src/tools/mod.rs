//! Tools the agent can call.
//!
//! - [`Tool`]: name, spec and async call.
//! - [`ToolRegistry`]: tools by name; `list()` feeds the model, `call()` runs one.
//! - [`VectorLookupTool`]: similarity lookup over an [`InMemoryVectorStore`](crate::vectorstore::InMemoryVectorStore).

mod registry;
mod r#trait;
mod vector_lookup;

pub use r#trait::{Tool, ToolCallContent, ToolError, ToolSpec};
pub use registry::ToolRegistry;
pub use vector_lookup::VectorLookupTool;
