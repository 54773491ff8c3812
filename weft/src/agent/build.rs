//! Tool-calling agent graph: `__start__ -> agent -?-> tools | __end__`, `tools -> agent`.

use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, START};
use crate::llm::LlmClient;
use crate::memory::{Checkpointer, RunnableConfig};
use crate::prompts::PromptError;
use crate::state::{MessagesState, MessagesUpdater};
use crate::tools::ToolRegistry;

use super::agent_node::AgentNode;
use super::condition::tools_condition;
use super::tool_node::ToolNode;

/// Step budget for one [`ToolAgent::invoke`].
pub const AGENT_RECURSION_LIMIT: usize = 15;

/// Error building the agent graph.
#[derive(Debug, thiserror::Error)]
pub enum BuildAgentError {
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),
    #[error("graph: {0}")]
    Compilation(#[from] CompilationError),
}

/// Builds the agent graph. With a checkpointer, runs with a thread id resume and save
/// that thread's conversation.
pub fn build_tool_agent(
    llm: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    system_prompt: &str,
    checkpointer: Option<Arc<dyn Checkpointer<MessagesState>>>,
) -> Result<CompiledStateGraph<MessagesState>, BuildAgentError> {
    let agent = AgentNode::new(llm, system_prompt, registry.list())?;
    let tools = ToolNode::new(registry);

    let mut graph = StateGraph::<MessagesState>::new().with_state_updater(Arc::new(MessagesUpdater));
    graph
        .add_node("agent", Arc::new(agent))
        .add_node("tools", Arc::new(tools))
        .add_edge(START, "agent")
        .add_conditional_edges(
            "agent",
            Arc::new(|state: &MessagesState| tools_condition(state).map(|r| r.as_str().to_string())),
            None,
        )
        .add_edge("tools", "agent");

    Ok(match checkpointer {
        Some(cp) => graph.compile_with_checkpointer(cp)?,
        None => graph.compile()?,
    })
}

/// Runs one user turn on a thread and returns the final message text.
#[derive(Clone)]
pub struct ToolAgent {
    graph: CompiledStateGraph<MessagesState>,
    recursion_limit: usize,
}

impl ToolAgent {
    pub fn new(graph: CompiledStateGraph<MessagesState>) -> Self {
        Self {
            graph,
            recursion_limit: AGENT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Full state after the turn.
    pub async fn invoke_state(&self, query: &str, thread_id: &str) -> Result<MessagesState, AgentError> {
        let config = RunnableConfig::for_thread(thread_id).with_recursion_limit(self.recursion_limit);
        self.graph
            .invoke(MessagesState::from_user(query), Some(config))
            .await
    }

    pub async fn invoke(&self, query: &str, thread_id: &str) -> Result<String, AgentError> {
        let state = self.invoke_state(query, thread_id).await?;
        let answer = state
            .last_message()
            .map(|m| m.content().to_string())
            .unwrap_or_default();
        tracing::info!(thread_id, messages = state.messages.len(), "agent turn complete");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::memory::MemorySaver;
    use crate::message::{Message, ToolCall};

    /// **Scenario**: a model that never stops calling tools hits the step budget.
    #[tokio::test]
    async fn endless_tool_calls_hit_recursion_limit() {
        let call = ToolCall {
            id: Some("c".into()),
            name: "nothing".into(),
            arguments: "{}".into(),
        };
        let llm = Arc::new(MockLlm::with_tool_calls("", vec![call]));
        let graph = build_tool_agent(llm, Arc::new(ToolRegistry::new()), "sys", None).unwrap();
        let agent = ToolAgent::new(graph);
        assert!(matches!(
            agent.invoke("loop", "t").await,
            Err(AgentError::RecursionLimit(15))
        ));
    }

    /// **Scenario**: a second turn on the same thread sees the first turn's messages.
    #[tokio::test]
    async fn thread_history_carries_over() {
        let llm = Arc::new(MockLlm::new("noted"));
        let saver: Arc<dyn Checkpointer<MessagesState>> = Arc::new(MemorySaver::new());
        let graph = build_tool_agent(llm.clone(), Arc::new(ToolRegistry::new()), "sys", Some(saver))
            .unwrap();
        let agent = ToolAgent::new(graph);

        agent.invoke("my name is Omar", "t1").await.unwrap();
        let state = agent.invoke_state("what is my name?", "t1").await.unwrap();
        assert_eq!(
            state.messages,
            vec![
                Message::user("my name is Omar"),
                Message::assistant("noted"),
                Message::user("what is my name?"),
                Message::assistant("noted"),
            ]
        );
        // System prompt + 3 history messages on the second call.
        assert_eq!(llm.calls()[1].len(), 4);

        let other = agent.invoke_state("hi", "t2").await.unwrap();
        assert_eq!(other.messages.len(), 2);
    }
}
