use crate::message::Message;
use crate::prompts::{buffer_string, PromptError, PromptTemplate, PromptValue, PromptValues};

/// Slot in a chat prompt filled with a message list bound under `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagesPlaceholder {
    pub name: String,
    /// When true, an unbound name expands to no messages instead of failing.
    pub optional: bool,
}

impl MessagesPlaceholder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    fn expand(&self, values: &PromptValues) -> Result<Vec<Message>, PromptError> {
        match values.get(&self.name) {
            Some(PromptValue::Messages(messages)) => Ok(messages.clone()),
            Some(PromptValue::Text(text)) => Ok(vec![Message::user(text.clone())]),
            None if self.optional => Ok(Vec::new()),
            None => Err(PromptError::MissingVariable(self.name.clone())),
        }
    }
}

/// One entry passed to [`ChatPromptTemplate::from_messages`].
#[derive(Debug, Clone, PartialEq)]
pub enum MessageTemplate {
    System(String),
    User(String),
    Assistant(String),
    Placeholder(MessagesPlaceholder),
}

impl MessageTemplate {
    /// Accepts `system`, `human`/`user` and `ai`/`assistant`.
    pub fn from_role(role: &str, template: impl Into<String>) -> Result<Self, PromptError> {
        let template = template.into();
        match role {
            "system" => Ok(Self::System(template)),
            "human" | "user" => Ok(Self::User(template)),
            "ai" | "assistant" => Ok(Self::Assistant(template)),
            other => Err(PromptError::UnknownRole(other.to_string())),
        }
    }
}

impl From<MessagesPlaceholder> for MessageTemplate {
    fn from(p: MessagesPlaceholder) -> Self {
        MessageTemplate::Placeholder(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Message(Role, PromptTemplate),
    Placeholder(MessagesPlaceholder),
}

/// Message-list template: role templates interleaved with placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPromptTemplate {
    parts: Vec<Part>,
}

impl ChatPromptTemplate {
    pub fn from_messages<I, T>(messages: I) -> Result<Self, PromptError>
    where
        I: IntoIterator<Item = T>,
        T: Into<MessageTemplate>,
    {
        let parts = messages
            .into_iter()
            .map(|m| match m.into() {
                MessageTemplate::System(t) => {
                    Ok(Part::Message(Role::System, PromptTemplate::from_template(t)?))
                }
                MessageTemplate::User(t) => {
                    Ok(Part::Message(Role::User, PromptTemplate::from_template(t)?))
                }
                MessageTemplate::Assistant(t) => Ok(Part::Message(
                    Role::Assistant,
                    PromptTemplate::from_template(t)?,
                )),
                MessageTemplate::Placeholder(p) => Ok(Part::Placeholder(p)),
            })
            .collect::<Result<Vec<_>, PromptError>>()?;
        Ok(Self { parts })
    }

    /// Single user message.
    pub fn from_template(template: impl Into<String>) -> Result<Self, PromptError> {
        Self::from_messages([MessageTemplate::User(template.into())])
    }

    /// Template variables and non-optional placeholder names, first appearance first.
    pub fn input_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for part in &self.parts {
            let names = match part {
                Part::Message(_, t) => t.input_variables(),
                Part::Placeholder(p) if !p.optional => vec![p.name.clone()],
                Part::Placeholder(_) => Vec::new(),
            };
            for name in names {
                if !vars.contains(&name) {
                    vars.push(name);
                }
            }
        }
        vars
    }

    pub fn format_messages(&self, values: &PromptValues) -> Result<Vec<Message>, PromptError> {
        let mut out = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                Part::Message(role, template) => {
                    let text = template.format(values)?;
                    out.push(match role {
                        Role::System => Message::system(text),
                        Role::User => Message::user(text),
                        Role::Assistant => Message::assistant(text),
                    });
                }
                Part::Placeholder(p) => out.extend(p.expand(values)?),
            }
        }
        Ok(out)
    }

    /// Formatted messages as `role: content` lines.
    pub fn format(&self, values: &PromptValues) -> Result<String, PromptError> {
        Ok(buffer_string(&self.format_messages(values)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: system + human templates render into two messages.
    #[test]
    fn format_role_templates() {
        let prompt = ChatPromptTemplate::from_messages([
            MessageTemplate::from_role(
                "system",
                "You are a helpful assistant that translates {input_language} to {output_language}.",
            )
            .unwrap(),
            MessageTemplate::from_role("human", "{text}").unwrap(),
        ])
        .unwrap();
        assert_eq!(
            prompt.input_variables(),
            vec!["input_language", "output_language", "text"]
        );
        let messages = prompt
            .format_messages(
                &PromptValues::new()
                    .with("input_language", "English")
                    .with("output_language", "Arabic")
                    .with("text", "I love programming."),
            )
            .unwrap();
        assert_eq!(
            messages,
            vec![
                Message::system("You are a helpful assistant that translates English to Arabic."),
                Message::user("I love programming."),
            ]
        );
    }

    /// **Scenario**: a placeholder expands to the bound list; text binds as one user message.
    #[test]
    fn placeholder_expansion() {
        let prompt = ChatPromptTemplate::from_messages([
            MessageTemplate::System("You are a helpful assistant".into()),
            MessagesPlaceholder::new("msgs").into(),
        ])
        .unwrap();
        let history = vec![Message::user("hi there"), Message::assistant("hello")];
        let messages = prompt
            .format_messages(&PromptValues::new().with("msgs", history.clone()))
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(&messages[1..], history.as_slice());

        let messages = prompt
            .format_messages(&PromptValues::new().with("msgs", "im omar"))
            .unwrap();
        assert_eq!(messages[1], Message::user("im omar"));

        assert_eq!(
            prompt.format_messages(&PromptValues::new()),
            Err(PromptError::MissingVariable("msgs".into()))
        );
    }

    #[test]
    fn optional_placeholder_and_unknown_role() {
        let prompt = ChatPromptTemplate::from_messages([
            MessageTemplate::from(MessagesPlaceholder::optional("history")),
            MessageTemplate::User("{q}".into()),
        ])
        .unwrap();
        assert_eq!(prompt.input_variables(), vec!["q"]);
        let messages = prompt
            .format_messages(&PromptValues::new().with("q", "why?"))
            .unwrap();
        assert_eq!(messages, vec![Message::user("why?")]);
        assert_eq!(
            prompt.format(&PromptValues::new().with("q", "why?")).unwrap(),
            "user: why?"
        );

        assert_eq!(
            MessageTemplate::from_role("narrator", "x"),
            Err(PromptError::UnknownRole("narrator".into()))
        );
    }

    #[test]
    fn from_template_is_single_user_message() {
        let prompt = ChatPromptTemplate::from_template("Tell me about {topic}").unwrap();
        let messages = prompt
            .format_messages(&PromptValues::new().with("topic", "weaving"))
            .unwrap();
        assert_eq!(messages, vec![Message::user("Tell me about weaving")]);
    }
}
