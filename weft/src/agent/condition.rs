//! Routing after the agent node: run tools, or finish.

use crate::error::AgentError;
use crate::message::Message;
use crate::state::MessagesState;

/// Where to go after the agent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Run the requested tool calls (`"tools"`).
    Tools,
    /// Finish the run (`"__end__"`).
    End,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::End => crate::graph::END,
        }
    }
}

/// `Tools` when the last message is an assistant turn with tool calls, otherwise `End`.
///
/// An empty conversation is a broken precondition: `AgentError::EmptyConversation`.
pub fn tools_condition(state: &MessagesState) -> Result<Route, AgentError> {
    match state.last_message() {
        None => Err(AgentError::EmptyConversation),
        Some(Message::Assistant { tool_calls, .. }) if !tool_calls.is_empty() => Ok(Route::Tools),
        Some(_) => Ok(Route::End),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;

    fn call() -> ToolCall {
        ToolCall {
            id: Some("tc1".into()),
            name: "employee_lookup".into(),
            arguments: r#"{"query":"engineers"}"#.into(),
        }
    }

    #[test]
    fn assistant_with_tool_calls_routes_to_tools() {
        let state = MessagesState::new(vec![
            Message::user("who are the engineers?"),
            Message::assistant_with_tool_calls("", vec![call()]),
        ]);
        assert_eq!(tools_condition(&state).unwrap(), Route::Tools);
        assert_eq!(Route::Tools.as_str(), "tools");
    }

    #[test]
    fn assistant_without_tool_calls_ends() {
        let state = MessagesState::new(vec![Message::user("hi"), Message::assistant("hello")]);
        assert_eq!(tools_condition(&state).unwrap(), Route::End);
        assert_eq!(Route::End.as_str(), "__end__");
    }

    /// **Scenario**: non-assistant last messages end the run.
    #[test]
    fn user_system_and_tool_messages_end() {
        for last in [
            Message::user("hi"),
            Message::system("s"),
            Message::tool("tc1", "[]"),
        ] {
            let state = MessagesState::new(vec![last]);
            assert_eq!(tools_condition(&state).unwrap(), Route::End);
        }
    }

    /// **Scenario**: routing an empty conversation is an error, not a route.
    #[test]
    fn empty_conversation_is_error() {
        assert!(matches!(
            tools_condition(&MessagesState::default()),
            Err(AgentError::EmptyConversation)
        ));
    }
}
