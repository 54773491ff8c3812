//! Tool node: execute the tool calls of the last assistant message.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::{Message, ToolCall};
use crate::state::MessagesState;
use crate::tools::ToolRegistry;

/// Content of a tool message for a failed call; `{error}` is replaced.
pub const TOOL_ERROR_TEMPLATE: &str = "Error: {error}\n Please fix your mistakes.";

/// Runs every tool call concurrently and returns one `Tool` message per call, in call
/// order. Failures become the message content so the model can react to them.
pub struct ToolNode {
    registry: Arc<ToolRegistry>,
}

impl ToolNode {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    async fn run_call(&self, call: &ToolCall) -> Message {
        let args = if call.arguments.trim().is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str::<Value>(&call.arguments)
                .map_err(|e| format!("invalid arguments for {}: {}", call.name, e))
        };
        let content = match args {
            Ok(args) => match self.registry.call(&call.name, args).await {
                Ok(out) => out.text,
                Err(e) => {
                    tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                    TOOL_ERROR_TEMPLATE.replace("{error}", &e.to_string())
                }
            },
            Err(e) => TOOL_ERROR_TEMPLATE.replace("{error}", &e),
        };
        Message::tool(call.call_id(), content)
    }
}

#[async_trait]
impl Node<MessagesState> for ToolNode {
    fn id(&self) -> &str {
        "tools"
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let calls = state
            .last_message()
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();
        tracing::debug!(count = calls.len(), "running tool calls");
        let results = futures::future::join_all(calls.iter().map(|c| self.run_call(c))).await;
        Ok((MessagesState::new(results), Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolCallContent, ToolError, ToolSpec};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: None,
                input_schema: serde_json::json!({}),
            }
        }

        async fn call(&self, args: Value) -> Result<ToolCallContent, ToolError> {
            Ok(ToolCallContent::text(args.to_string()))
        }
    }

    fn call(id: Option<&str>, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.map(String::from),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// **Scenario**: one tool message per call, errors inlined as content.
    #[tokio::test]
    async fn runs_calls_and_inlines_errors() {
        let node = ToolNode::new(Arc::new(ToolRegistry::new().with_tool(Box::new(Echo))));
        let state = MessagesState::new(vec![
            Message::user("go"),
            Message::assistant_with_tool_calls(
                "",
                vec![
                    call(Some("c1"), "echo", r#"{"a":1}"#),
                    call(Some("c2"), "missing", "{}"),
                    call(None, "echo", "not json"),
                    call(Some("c4"), "echo", ""),
                ],
            ),
        ]);
        let (update, next) = node.run(state).await.unwrap();
        assert_eq!(next, Next::Continue);
        assert_eq!(update.messages.len(), 4);
        assert_eq!(update.messages[0], Message::tool("c1", r#"{"a":1}"#));
        assert!(update.messages[1].content().starts_with("Error: tool not found: missing"));
        assert!(matches!(
            &update.messages[2],
            Message::Tool { tool_call_id, content } if tool_call_id == "echo" && content.starts_with("Error: invalid arguments")
        ));
        assert_eq!(update.messages[3], Message::tool("c4", "{}"));
    }

    #[tokio::test]
    async fn no_tool_calls_no_messages() {
        let node = ToolNode::new(Arc::new(ToolRegistry::new()));
        let (update, _) = node.run(MessagesState::from_user("hi")).await.unwrap();
        assert!(update.messages.is_empty());
    }
}
