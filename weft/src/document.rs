//! Document: a unit of text plus free-form metadata.
//!
//! Produced by loaders, split by `RecursiveCharacterTextSplitter`, indexed by
//! `InMemoryVectorStore`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata map; shape is ad hoc per loader (`source`, `line`, `title`, ...).
pub type Metadata = BTreeMap<String, Value>;

/// Text content with metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Adds one metadata entry (builder).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// `metadata["source"]` as a string, when present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_metadata_and_source() {
        let doc = Document::new("body")
            .with_metadata("source", "a.txt")
            .with_metadata("line", 3);
        assert_eq!(doc.source(), Some("a.txt"));
        assert_eq!(doc.metadata["line"], 3);
    }
}
