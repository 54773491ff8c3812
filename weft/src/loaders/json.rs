use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::loaders::{DocumentLoader, LoaderError};

/// One document per string value in a JSON file.
///
/// With JSON pointers (e.g. `/name`), only strings under those pointers are taken;
/// arrays and objects below a pointer are walked. Metadata `source` and `line`
/// (1-based position in the output).
#[derive(Debug, Clone)]
pub struct JsonLoader {
    path: PathBuf,
    pointers: Vec<String>,
}

impl JsonLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pointers: Vec::new(),
        }
    }

    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointers.push(pointer.into());
        self
    }

    fn extract(&self, root: &Value) -> Vec<String> {
        let mut out = Vec::new();
        if self.pointers.is_empty() {
            collect_strings(root, &mut out);
            return out;
        }
        for pointer in &self.pointers {
            // Pointers apply to the root and, for a top-level array, to each element.
            match (root.pointer(pointer), root) {
                (Some(value), _) => collect_strings(value, &mut out),
                (None, Value::Array(items)) => {
                    for item in items {
                        if let Some(value) = item.pointer(pointer) {
                            collect_strings(value, &mut out);
                        }
                    }
                }
                (None, _) => {
                    tracing::warn!(pointer = %pointer, path = %self.path.display(), "json pointer matched nothing");
                }
            }
        }
        out
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

#[async_trait]
impl DocumentLoader for JsonLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoaderError::io(&self.path, e))?;
        let root: Value = serde_json::from_slice(&bytes)?;
        let source = self.path.display().to_string();
        Ok(self
            .extract(&root)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                Document::new(text)
                    .with_metadata("source", source.clone())
                    .with_metadata("line", i + 1)
            })
            .collect())
    }
}
