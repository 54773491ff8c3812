//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Works against any OpenAI-compatible endpoint (Groq, Mistral, Gemini and Cohere all
//! expose one); point it there with `OpenAIConfig::with_api_base`. Bound tools are
//! sent as function tools; assistant tool calls and tool results in the history are
//! mapped to their wire form so multi-step tool conversations round-trip.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, MessageChunk, ToolChoiceMode};
use crate::message::{Message, ToolCall};
use crate::tools::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

fn build_error(e: OpenAIError) -> AgentError {
    AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
}

/// OpenAI Chat Completions client.
///
/// `ChatOpenAI::new` reads `OPENAI_API_KEY`; `with_config` takes an explicit key and
/// base URL.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Vec<ToolSpec>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl ChatOpenAI {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: Vec::new(),
            temperature: None,
            tool_choice: None,
        }
    }

    /// Binds tools sent on every call (enables tool_calls in responses).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Temperature (0-2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Overrides the API default (auto) when tools are present.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn message_to_request(m: &Message) -> Result<ChatCompletionRequestMessage, AgentError> {
        Ok(match m {
            Message::System { content } => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(content.as_str()),
            ),
            Message::User { content } => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(content.as_str()),
            ),
            Message::Assistant {
                content,
                tool_calls,
            } if tool_calls.is_empty() => {
                ChatCompletionRequestMessage::Assistant(content.as_str().into())
            }
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let calls: Vec<ChatCompletionMessageToolCalls> = tool_calls
                    .iter()
                    .map(|tc| {
                        ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
                            id: tc.call_id(),
                            function: FunctionCall {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                    })
                    .collect();
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() {
                    args.content(content.as_str());
                }
                args.tool_calls(calls);
                ChatCompletionRequestMessage::Assistant(args.build().map_err(build_error)?)
            }
            Message::Tool {
                tool_call_id,
                content,
            } => ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .content(content.as_str())
                    .tool_call_id(tool_call_id.as_str())
                    .build()
                    .map_err(build_error)?,
            ),
        })
    }

    fn build_request(
        &self,
        messages: &[Message],
        extra_tools: &[ToolSpec],
        stream: bool,
    ) -> Result<CreateChatCompletionRequest, AgentError> {
        let openai_messages = messages
            .iter()
            .map(Self::message_to_request)
            .collect::<Result<Vec<_>, _>>()?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(openai_messages);
        if stream {
            args.stream(true);
        }

        let tools: Vec<ChatCompletionTools> = self
            .tools
            .iter()
            .chain(extra_tools.iter())
            .map(|t| {
                ChatCompletionTools::Function(ChatCompletionTool {
                    function: FunctionObject {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: Some(t.input_schema.clone()),
                        ..Default::default()
                    },
                })
            })
            .collect();
        if !tools.is_empty() {
            args.tools(tools);
            if let Some(mode) = self.tool_choice {
                let opt = match mode {
                    ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                    ToolChoiceMode::None => ToolChoiceOptions::None,
                    ToolChoiceMode::Required => ToolChoiceOptions::Required,
                };
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
            }
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        args.build().map_err(build_error)
    }

    async fn complete(
        &self,
        messages: &[Message],
        extra_tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let request = self.build_request(messages, extra_tools, false)?;
        debug!(
            model = %self.model,
            message_count = messages.len(),
            tools_count = self.tools.len() + extra_tools.len(),
            temperature = ?self.temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string(&request) {
            trace!(request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    id: Some(f.id),
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
                _ => None,
            })
            .collect();
        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.complete(messages, &[]).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.complete(messages, tools).await
    }

    /// Sends each content delta through `chunk_tx`; tool call deltas are accumulated by
    /// index and returned in the final response.
    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let Some(chunk_tx) = chunk_tx else {
            return self.invoke(messages).await;
        };
        let request = self.build_request(messages, &[], true)?;
        debug!(
            model = %self.model,
            message_count = messages.len(),
            stream = true,
            "OpenAI chat create_stream"
        );

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI stream error: {}", e)))?;

        let mut full_content = String::new();
        // index -> (id, name, arguments)
        let mut tool_call_map: BTreeMap<u32, (String, String, String)> = BTreeMap::new();
        let mut usage: Option<LlmUsage> = None;

        while let Some(result) = stream.next().await {
            let response = result
                .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI stream error: {}", e)))?;
            if let Some(u) = &response.usage {
                usage = Some(LlmUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                });
            }
            for choice in response.choices {
                let delta = choice.delta;
                if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
                    full_content.push_str(&content);
                    let _ = chunk_tx.send(MessageChunk { content }).await;
                }
                for tc in delta.tool_calls.unwrap_or_default() {
                    let entry = tool_call_map.entry(tc.index).or_default();
                    if let Some(id) = tc.id.filter(|id| !id.is_empty()) {
                        entry.0 = id;
                    }
                    if let Some(func) = tc.function {
                        if let Some(name) = func.name {
                            entry.1.push_str(&name);
                        }
                        if let Some(args) = func.arguments {
                            entry.2.push_str(&args);
                        }
                    }
                }
            }
        }

        let tool_calls = tool_call_map
            .into_values()
            .map(|(id, name, arguments)| ToolCall {
                id: if id.is_empty() { None } else { Some(id) },
                name,
                arguments,
            })
            .collect();
        Ok(LlmResponse {
            content: full_content,
            tool_calls,
            usage,
        })
    }
}
