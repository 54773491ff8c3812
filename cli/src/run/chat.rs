//! `chat`, `batch` and `probe`: plain model calls.

use std::sync::Arc;

use weft::prompts::MessageTemplate;
use weft::runnable::{LlmRunnable, ParserRunnable, PromptRunnable};
use weft::{
    probe_models, ChatPromptTemplate, LlmClient, ProbeOutcome, RunValue, Runnable,
    StringOutputParser,
};

use crate::RunError;

pub const DEFAULT_PROBE_INPUT: &str = "MistralAI is an AI company that ";

/// `prompt | llm | string` with an optional system message. `{input}` receives the user text.
pub async fn chat(
    llm: Arc<dyn LlmClient>,
    system: Option<&str>,
    input: &str,
) -> Result<String, RunError> {
    let mut parts = Vec::new();
    if let Some(system) = system {
        parts.push(MessageTemplate::System(system.to_string()));
    }
    parts.push(MessageTemplate::User("{input}".to_string()));
    let prompt = ChatPromptTemplate::from_messages(parts)?;

    let chain = PromptRunnable::chat(prompt)
        .pipe(LlmRunnable::new(llm))
        .pipe(ParserRunnable::new(StringOutputParser));
    let out = chain
        .invoke(RunValue::map([("input", RunValue::from(input))]))
        .await?;
    Ok(out.into_text()?)
}

/// Sends every input concurrently; replies keep input order.
pub async fn batch(llm: Arc<dyn LlmClient>, inputs: &[String]) -> Result<Vec<String>, RunError> {
    let chain = LlmRunnable::new(llm).pipe(ParserRunnable::new(StringOutputParser));
    let outputs = chain
        .batch(inputs.iter().map(|s| RunValue::from(s.as_str())).collect())
        .await?;
    outputs
        .into_iter()
        .map(|v| v.into_text().map_err(RunError::from))
        .collect()
}

/// Tries `input` on each model, one at a time.
pub async fn probe<F, E>(factory: F, models: &[String], input: &str) -> Vec<ProbeOutcome>
where
    F: Fn(&str) -> Result<Arc<dyn LlmClient>, E>,
    E: std::fmt::Display,
{
    probe_models(factory, models, input).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft::{Message, MockLlm};

    /// **Scenario**: the system message comes first and the input fills the user slot.
    #[tokio::test]
    async fn chat_formats_system_and_user() {
        let llm = Arc::new(MockLlm::echo());
        let out = chat(llm.clone(), Some("Translate into Arabic"), "hi!")
            .await
            .unwrap();
        assert_eq!(out, "hi!");
        assert_eq!(
            llm.calls()[0],
            vec![Message::system("Translate into Arabic"), Message::user("hi!")]
        );
    }

    /// **Scenario**: batch answers keep input order.
    #[tokio::test]
    async fn batch_keeps_order() {
        let inputs = vec!["hi there".to_string(), "who are you".to_string(), "what is 4 + 5".to_string()];
        let out = batch(Arc::new(MockLlm::echo()), &inputs).await.unwrap();
        assert_eq!(out, inputs);
    }

    /// **Scenario**: probe reports failures per model without stopping.
    #[tokio::test]
    async fn probe_reports_each_model() {
        let models = vec!["good".to_string(), "bad".to_string()];
        let outcomes = probe(
            |name: &str| -> Result<Arc<dyn LlmClient>, RunError> {
                if name == "good" {
                    Ok(Arc::new(MockLlm::new("ok")))
                } else {
                    Ok(Arc::new(MockLlm::scripted(vec![])))
                }
            },
            &models,
            DEFAULT_PROBE_INPUT,
        )
        .await;
        assert_eq!(outcomes[0].to_string(), "Model good: ✅ Worked");
        assert_eq!(outcomes[1].to_string(), "Model bad: ❌ Error");
    }
}
