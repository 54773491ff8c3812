//! Prompt templates.
//!
//! [`PromptTemplate`] renders one string from named variables (f-string `{var}` or
//! mustache `{{var}}`). [`ChatPromptTemplate`] renders a message list, expanding
//! [`MessagesPlaceholder`]s to message lists bound in the [`PromptValues`].

mod chat;
mod template;

pub use chat::{ChatPromptTemplate, MessageTemplate, MessagesPlaceholder};
pub use template::{PromptTemplate, TemplateFormat};

use std::collections::BTreeMap;

use crate::message::Message;

/// Prompt construction and formatting errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("missing value for prompt variable `{0}`")]
    MissingVariable(String),
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("unknown message role: {0}")]
    UnknownRole(String),
}

/// Value bound to one prompt variable.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Messages(Vec<Message>),
}

impl PromptValue {
    /// Text form: messages render one `role: content` line each.
    pub fn to_text(&self) -> String {
        match self {
            PromptValue::Text(s) => s.clone(),
            PromptValue::Messages(messages) => buffer_string(messages),
        }
    }
}

impl From<&str> for PromptValue {
    fn from(s: &str) -> Self {
        PromptValue::Text(s.to_string())
    }
}

impl From<String> for PromptValue {
    fn from(s: String) -> Self {
        PromptValue::Text(s)
    }
}

impl From<Vec<Message>> for PromptValue {
    fn from(messages: Vec<Message>) -> Self {
        PromptValue::Messages(messages)
    }
}

/// Variable name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptValues(BTreeMap<String, PromptValue>);

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` (builder).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PromptValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PromptValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PromptValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PromptValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<PromptValue>> FromIterator<(K, V)> for PromptValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Messages as `role: content` lines.
pub fn buffer_string(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role(), m.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
