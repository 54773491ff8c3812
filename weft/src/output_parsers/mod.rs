//! Output parsers: turn model text into typed values.

mod json;
mod list;
mod structured;

pub use json::{strip_code_fence, JsonOutputParser};
pub use list::CommaSeparatedListOutputParser;
pub use structured::StructuredOutputParser;

/// Parse failures.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a JSON object, got: {0}")]
    NotAnObject(String),
    #[error("missing key: {0}")]
    MissingKey(String),
    #[error("output does not match schema: {0}")]
    Schema(String),
}

/// Parses model output text.
pub trait OutputParser: Send + Sync {
    type Output;

    fn parse(&self, text: &str) -> Result<Self::Output, ParseError>;

    /// Instructions to put in the prompt; empty when the parser accepts anything.
    fn format_instructions(&self) -> String {
        String::new()
    }
}

/// Identity parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringOutputParser;

impl OutputParser for StringOutputParser {
    type Output = String;

    fn parse(&self, text: &str) -> Result<String, ParseError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_parser_is_identity() {
        let p = StringOutputParser;
        assert_eq!(p.parse("  as is \n").unwrap(), "  as is \n");
        assert!(p.format_instructions().is_empty());
    }
}
