use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tool description offered to the model: name, optional description and JSON schema
/// for the arguments object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

/// Text result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

impl ToolCallContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Tool lookup and execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// A single tool the model can call.
///
/// Each tool has a unique name, a specification (description and JSON schema) and the
/// call logic. Tools are registered with [`ToolRegistry`](super::ToolRegistry), listed
/// for the model by `AgentNode` and executed by `ToolNode`.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use weft::tools::{Tool, ToolCallContent, ToolError, ToolSpec};
///
/// struct Clock;
///
/// #[async_trait]
/// impl Tool for Clock {
///     fn name(&self) -> &str {
///         "clock"
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: "clock".to_string(),
///             description: Some("Current time".to_string()),
///             input_schema: serde_json::json!({ "type": "object" }),
///         }
///     }
///
///     async fn call(&self, _args: Value) -> Result<ToolCallContent, ToolError> {
///         Ok(ToolCallContent::text("12:00"))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a registry; the model calls the tool by it.
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    /// Executes the tool with the decoded arguments object.
    ///
    /// Returns `ToolError::InvalidInput` when `args` does not match the schema.
    async fn call(&self, args: serde_json::Value) -> Result<ToolCallContent, ToolError>;
}
