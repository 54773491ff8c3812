use serde_json::Value;

use crate::output_parsers::{OutputParser, ParseError};

/// Removes a surrounding markdown code fence (```` ``` ```` or ```` ```json ````), if any.
///
/// Text before the opening fence is dropped, so "Here you go:\n```json\n{..}\n```" works.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_ticks = &trimmed[start + 3..];
    // Info string is a bare word (`json`, `jsonc`); the body may follow it on the same line.
    let info_len = if after_ticks.starts_with(|c: char| c.is_ascii_alphabetic()) {
        after_ticks
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
            .unwrap_or(after_ticks.len())
    } else {
        0
    };
    let body = &after_ticks[info_len..];
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parses JSON, tolerating a markdown code fence around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOutputParser;

impl OutputParser for JsonOutputParser {
    type Output = Value;

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        Ok(serde_json::from_str(strip_code_fence(text))?)
    }

    fn format_instructions(&self) -> String {
        "Return a valid JSON value and nothing else.".to_string()
    }
}
