//! Model availability probe: try a prompt against several models, one after another.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::llm::LlmClient;
use crate::message::Message;

/// Result of probing one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub model: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            write!(f, "Model {}: ✅ Worked", self.model)
        } else {
            write!(f, "Model {}: ❌ Error", self.model)
        }
    }
}

/// Invokes `input` on each model built by `factory`, sequentially. A model that cannot be
/// built or fails to answer is reported in its outcome and never stops the probe.
pub async fn probe_models<F, E>(factory: F, models: &[String], input: &str) -> Vec<ProbeOutcome>
where
    F: Fn(&str) -> Result<Arc<dyn LlmClient>, E>,
    E: fmt::Display,
{
    let mut outcomes = Vec::with_capacity(models.len());
    for model in models {
        let answer = match factory(model) {
            Ok(llm) => llm.invoke(&[Message::user(input)]).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let outcome = match answer {
            Ok(_) => ProbeOutcome {
                model: model.clone(),
                ok: true,
                error: None,
            },
            Err(e) => {
                tracing::debug!(model = %model, error = %e, "model probe failed");
                ProbeOutcome {
                    model: model.clone(),
                    ok: false,
                    error: Some(e),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}
