//! Mock LLM for tests and offline demos.
//!
//! Three modes: a fixed response, a scripted sequence (one response per call, the last
//! one repeating), or echo (replies with the last user message).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tools::ToolSpec;

enum Mode {
    Fixed(LlmResponse),
    Script(Mutex<VecDeque<LlmResponse>>),
    Echo,
}

/// Mock LLM. Records every message list it was called with.
pub struct MockLlm {
    mode: Mode,
    calls: Mutex<Vec<Vec<Message>>>,
    tools_seen: Mutex<Vec<String>>,
}

impl MockLlm {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
            tools_seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `content` with no tool calls.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_mode(Mode::Fixed(LlmResponse::text(content)))
    }

    /// Always answers `content` plus `tool_calls`.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::with_mode(Mode::Fixed(LlmResponse::with_tool_calls(content, tool_calls)))
    }

    /// Answers with `responses` in order; after the last one, keeps repeating it.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self::with_mode(Mode::Script(Mutex::new(responses.into())))
    }

    /// First call requests `tool_call`, later calls answer `final_answer`.
    pub fn tool_then_answer(tool_call: ToolCall, final_answer: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse::with_tool_calls("", vec![tool_call]),
            LlmResponse::text(final_answer),
        ])
    }

    /// Replies with the content of the last user message.
    pub fn echo() -> Self {
        Self::with_mode(Mode::Echo)
    }

    /// Message lists received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Names of tools offered through `invoke_with_tools`, in call order.
    pub fn tools_seen(&self) -> Vec<String> {
        self.tools_seen.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn poisoned() -> AgentError {
        AgentError::ExecutionFailed("mock llm lock poisoned".into())
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.calls
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(messages.to_vec());
        match &self.mode {
            Mode::Fixed(response) => Ok(response.clone()),
            Mode::Script(queue) => {
                let mut queue = queue.lock().map_err(|_| Self::poisoned())?;
                match queue.len() {
                    0 => Err(AgentError::ExecutionFailed(
                        "mock llm script is empty".into(),
                    )),
                    1 => Ok(queue[0].clone()),
                    _ => Ok(queue.pop_front().unwrap_or_default()),
                }
            }
            Mode::Echo => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find(|m| matches!(m, Message::User { .. }))
                    .map(|m| m.content().to_string())
                    .unwrap_or_default();
                Ok(LlmResponse::text(last_user))
            }
        }
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.tools_seen
            .lock()
            .map_err(|_| Self::poisoned())?
            .extend(tools.iter().map(|t| t.name.clone()));
        self.invoke(messages).await
    }
}
