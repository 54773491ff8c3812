use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Document;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::output_parsers::OutputParser;
use crate::prompts::{ChatPromptTemplate, PromptTemplate, PromptValues};
use crate::runnable::{ChainError, RunValue, Runnable};
use crate::vectorstore::VectorStoreRetriever;

/// Page contents joined by blank lines.
pub fn format_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Documents -> Text via [`format_documents`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatDocuments;

#[async_trait]
impl Runnable for FormatDocuments {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        match input {
            RunValue::Documents(docs) => Ok(RunValue::Text(format_documents(&docs))),
            other => Err(ChainError::unexpected("documents", &other)),
        }
    }
}

#[derive(Debug, Clone)]
enum PromptKind {
    Text(PromptTemplate),
    Chat(ChatPromptTemplate),
}

/// Formats a prompt from a map input.
///
/// Chat templates yield `Messages`, string templates yield `Text`. A text input is
/// accepted when the template has exactly one input variable.
#[derive(Debug, Clone)]
pub struct PromptRunnable {
    kind: PromptKind,
}

impl PromptRunnable {
    pub fn chat(template: ChatPromptTemplate) -> Self {
        Self {
            kind: PromptKind::Chat(template),
        }
    }

    pub fn text(template: PromptTemplate) -> Self {
        Self {
            kind: PromptKind::Text(template),
        }
    }

    fn input_variables(&self) -> Vec<String> {
        match &self.kind {
            PromptKind::Text(t) => t.input_variables(),
            PromptKind::Chat(t) => t.input_variables(),
        }
    }

    fn values(&self, input: RunValue) -> Result<PromptValues, ChainError> {
        match input {
            RunValue::Map(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), v.to_prompt_value()))
                .collect()),
            RunValue::Null => Ok(PromptValues::new()),
            other => {
                let vars = self.input_variables();
                match vars.as_slice() {
                    [only] => Ok(PromptValues::new().with(only.clone(), other.to_prompt_value())),
                    _ => Err(ChainError::unexpected("map", &other)),
                }
            }
        }
    }
}

impl From<ChatPromptTemplate> for PromptRunnable {
    fn from(t: ChatPromptTemplate) -> Self {
        Self::chat(t)
    }
}

impl From<PromptTemplate> for PromptRunnable {
    fn from(t: PromptTemplate) -> Self {
        Self::text(t)
    }
}

#[async_trait]
impl Runnable for PromptRunnable {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let values = self.values(input)?;
        Ok(match &self.kind {
            PromptKind::Text(t) => RunValue::Text(t.format(&values)?),
            PromptKind::Chat(t) => RunValue::Messages(t.format_messages(&values)?),
        })
    }
}

/// Calls a chat model. Text input becomes one user message; output is the reply text.
#[derive(Clone)]
pub struct LlmRunnable {
    llm: Arc<dyn LlmClient>,
}

impl LlmRunnable {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Runnable for LlmRunnable {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let messages = match input {
            RunValue::Messages(m) => m,
            RunValue::Text(t) => vec![Message::user(t)],
            other => return Err(ChainError::unexpected("messages or text", &other)),
        };
        let response = self.llm.invoke(&messages).await?;
        Ok(RunValue::Text(response.content))
    }
}

/// Applies an output parser to text input.
#[derive(Debug, Clone)]
pub struct ParserRunnable<P> {
    parser: P,
}

impl<P> ParserRunnable<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl<P> Runnable for ParserRunnable<P>
where
    P: OutputParser,
    P::Output: Into<RunValue>,
{
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let text = input.into_text()?;
        Ok(self.parser.parse(&text)?.into())
    }
}

/// Text query -> top-k Documents.
#[derive(Clone)]
pub struct RetrieverRunnable {
    retriever: VectorStoreRetriever,
}

impl RetrieverRunnable {
    pub fn new(retriever: VectorStoreRetriever) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Runnable for RetrieverRunnable {
    async fn invoke(&self, input: RunValue) -> Result<RunValue, ChainError> {
        let query = input.into_text()?;
        Ok(RunValue::Documents(self.retriever.invoke(&query).await?))
    }
}
