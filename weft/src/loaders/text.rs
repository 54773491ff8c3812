use std::path::PathBuf;

use async_trait::async_trait;

use crate::document::Document;
use crate::loaders::{DocumentLoader, LoaderError};

/// Whole file as one document; metadata `source`.
#[derive(Debug, Clone)]
pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoaderError::io(&self.path, e))?;
        Ok(vec![
            Document::new(text).with_metadata("source", self.path.display().to_string())
        ])
    }
}
