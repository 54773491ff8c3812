//! `parse`: prompt, model and one of the output parsers.

use std::str::FromStr;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use weft::output_parsers::{
    CommaSeparatedListOutputParser, JsonOutputParser, StructuredOutputParser,
};
use weft::prompts::MessageTemplate;
use weft::runnable::{LlmRunnable, ParserRunnable, PromptRunnable};
use weft::{ChatPromptTemplate, LlmClient, OutputParser, RunValue, Runnable};

use crate::RunError;

/// Extraction prompt shared by the structured parsers.
pub const EXTRACT_TEMPLATE: &str = "Extract information from the following phrase.
formatting instructions: {format}
Phrase: {phrase}

## RETURN THE VALID JSON OBJECT AND NOTHING ELSE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    /// Comma-separated names for the input topic.
    List,
    /// Free-form JSON object.
    Json,
    /// name / age / gender extracted from a phrase.
    Person,
    /// Typed recipe extracted through a derived JSON schema.
    Recipe,
}

impl FromStr for ParseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "json" => Ok(Self::Json),
            "person" | "structured" => Ok(Self::Person),
            "recipe" => Ok(Self::Recipe),
            other => Err(format!(
                "unknown parser: {} (use list, json, person or recipe)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recipe {
    /// name of the recipe
    pub recipe: String,
    /// components of the recipe
    pub components: Vec<String>,
}

fn person_parser() -> StructuredOutputParser {
    StructuredOutputParser::from_names_and_descriptions([
        ("name", "the name of the person"),
        ("age", "the age of the person"),
        ("gender", "the gender of the person male/female"),
    ])
}

async fn extract(
    llm: Arc<dyn LlmClient>,
    parser: StructuredOutputParser,
    phrase: &str,
) -> Result<Value, RunError> {
    let format = parser.format_instructions();
    let chain = PromptRunnable::chat(ChatPromptTemplate::from_template(EXTRACT_TEMPLATE)?)
        .pipe(LlmRunnable::new(llm))
        .pipe(ParserRunnable::new(parser));
    let out = chain
        .invoke(RunValue::map([("format", format.as_str()), ("phrase", phrase)]))
        .await?;
    Ok(out.to_json())
}

/// Runs `input` through the prompt for `kind` and returns the parsed value as JSON.
pub async fn parse(
    llm: Arc<dyn LlmClient>,
    kind: ParseKind,
    input: &str,
) -> Result<Value, RunError> {
    match kind {
        ParseKind::List => {
            let prompt = ChatPromptTemplate::from_messages([
                MessageTemplate::System("you are an ai assistant".into()),
                MessageTemplate::User("suggest 5 names separated by commas for {input}".into()),
            ])?;
            let chain = PromptRunnable::chat(prompt)
                .pipe(LlmRunnable::new(llm))
                .pipe(ParserRunnable::new(CommaSeparatedListOutputParser));
            Ok(chain.invoke(RunValue::from(input)).await?.to_json())
        }
        ParseKind::Json => {
            let prompt = ChatPromptTemplate::from_messages([
                MessageTemplate::System("You are a helpful assistant. Answer in JSON format.".into()),
                MessageTemplate::User("{input}".into()),
            ])?;
            let chain = PromptRunnable::chat(prompt)
                .pipe(LlmRunnable::new(llm))
                .pipe(ParserRunnable::new(JsonOutputParser));
            Ok(chain.invoke(RunValue::from(input)).await?.to_json())
        }
        ParseKind::Person => extract(llm, person_parser(), input).await,
        ParseKind::Recipe => extract(llm, StructuredOutputParser::from_schema::<Recipe>(), input).await,
    }
}
