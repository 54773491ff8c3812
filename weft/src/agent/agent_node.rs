//! Agent node: prompt over the conversation, one model call with the tools offered.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::prompts::{ChatPromptTemplate, MessageTemplate, MessagesPlaceholder, PromptError, PromptValues};
use crate::state::MessagesState;
use crate::tools::ToolSpec;

/// Placeholder the conversation is bound to.
const MESSAGES_KEY: &str = "messages";

pub struct AgentNode {
    llm: Arc<dyn LlmClient>,
    prompt: ChatPromptTemplate,
    tools: Vec<ToolSpec>,
}

impl AgentNode {
    /// Prompt is `[(system, system_prompt), MessagesPlaceholder("messages")]`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        system_prompt: &str,
        tools: Vec<ToolSpec>,
    ) -> Result<Self, PromptError> {
        let prompt = ChatPromptTemplate::from_messages([
            MessageTemplate::System(system_prompt.to_string()),
            MessagesPlaceholder::new(MESSAGES_KEY).into(),
        ])?;
        Ok(Self { llm, prompt, tools })
    }
}

#[async_trait]
impl Node<MessagesState> for AgentNode {
    fn id(&self) -> &str {
        "agent"
    }

    async fn run(&self, state: MessagesState) -> Result<(MessagesState, Next), AgentError> {
        let values = PromptValues::new().with(MESSAGES_KEY, state.messages);
        let messages = self
            .prompt
            .format_messages(&values)
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        let response = self.llm.invoke_with_tools(&messages, &self.tools).await?;
        tracing::debug!(
            tool_calls = response.tool_calls.len(),
            content_len = response.content.len(),
            "agent response"
        );
        Ok((
            MessagesState::new(vec![response.into_message()]),
            Next::Continue,
        ))
    }
}
