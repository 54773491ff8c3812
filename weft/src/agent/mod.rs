//! Tool-calling agent.
//!
//! - [`AgentNode`]: system prompt + conversation, one model call with the registry's tools.
//! - [`ToolNode`]: runs the requested tool calls, appends one `Tool` message per call.
//! - [`tools_condition`]: routes to `tools` or `__end__`.
//! - [`build_tool_agent`] wires them into a graph; [`ToolAgent`] runs one turn per thread.

mod agent_node;
mod build;
mod condition;
mod tool_node;

pub use agent_node::AgentNode;
pub use build::{build_tool_agent, BuildAgentError, ToolAgent, AGENT_RECURSION_LIMIT};
pub use condition::{tools_condition, Route};
pub use tool_node::{ToolNode, TOOL_ERROR_TEMPLATE};

/// System prompt of the HR assistant demo.
pub const HR_SYSTEM_PROMPT: &str = "You are a helpful HR AI assistant. Use the provided tools to answer questions about employees. Format responses clearly and concisely.";
