//! Conversation state shared by the agent graph.
//!
//! [`MessagesState`] holds the ordered message list; [`MessagesUpdater`] is its reducer:
//! node outputs and new turns are appended, never replacing or truncating history.

use serde::{Deserialize, Serialize};

use crate::channels::StateUpdater;
use crate::message::Message;

/// Graph state for chat agents: the conversation so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesState {
    pub messages: Vec<Message>,
}

impl MessagesState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// State holding a single user message (the input of one agent turn).
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![Message::user(content)])
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Reducer for [`MessagesState`]: concatenates `update.messages` onto the current list.
///
/// Merging is associative and preserves order: applying `[a]` then `[b]` yields the
/// same list as applying `[a, b]` once.
#[derive(Debug, Clone, Default)]
pub struct MessagesUpdater;

impl StateUpdater<MessagesState> for MessagesUpdater {
    fn apply_update(&self, current: &mut MessagesState, update: &MessagesState) {
        current.messages.extend(update.messages.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: merging [a] then [b] equals merging [a, b] in one step.
    #[test]
    fn merge_is_associative_and_order_preserving() {
        let a = Message::user("a");
        let b = Message::assistant("b");

        let mut stepwise = MessagesState::default();
        MessagesUpdater.apply_update(&mut stepwise, &MessagesState::new(vec![a.clone()]));
        MessagesUpdater.apply_update(&mut stepwise, &MessagesState::new(vec![b.clone()]));

        let mut at_once = MessagesState::default();
        MessagesUpdater.apply_update(&mut at_once, &MessagesState::new(vec![a.clone(), b.clone()]));

        assert_eq!(stepwise, at_once);
        assert_eq!(stepwise.messages, vec![a, b]);
    }

    /// **Scenario**: an empty update leaves history untouched (never truncates).
    #[test]
    fn empty_update_keeps_history() {
        let mut state = MessagesState::from_user("hi");
        MessagesUpdater.apply_update(&mut state, &MessagesState::default());
        assert_eq!(state.messages.len(), 1);
    }
}
