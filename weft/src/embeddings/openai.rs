//! OpenAI Embeddings implementation of [`Embedder`].
//!
//! Any OpenAI-compatible `/embeddings` endpoint works (Cohere and Gemini expose one);
//! configure it with `OpenAIConfig::with_api_base`.

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use super::{Embedder, EmbeddingError};

/// OpenAI-compatible embeddings client.
///
/// ```ignore
/// let embedder = OpenAIEmbedder::new("text-embedding-3-small");
/// let vectors = embedder.embed(&["Hello, world!"]).await?;
/// ```
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Reads the API key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::get_model_dimensions(&model);
        Self {
            client: Client::with_config(config),
            model,
            dimensions,
        }
    }

    /// Known output sizes; unknown models are assumed to produce 1536.
    fn get_model_dimensions(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            "text-embedding-3-small" | "text-embedding-ada-002" | "embed-v4.0" => 1536,
            "embed-english-v3.0" | "embed-multilingual-v3.0" | "mistral-embed" => 1024,
            "text-embedding-004" => 768,
            _ => 1536,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let input = match texts {
            [one] => EmbeddingInput::String(one.to_string()),
            many => EmbeddingInput::StringArray(many.iter().map(|s| s.to_string()).collect()),
        };
        let request = CreateEmbeddingRequest {
            input,
            model: self.model.clone(),
            ..Default::default()
        };
        tracing::debug!(model = %self.model, count = texts.len(), "OpenAI embeddings create");

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EmbeddingError::Api(format!("OpenAI API error: {}", e)))?;
        if response.data.is_empty() {
            return Err(EmbeddingError::EmptyResponse);
        }
        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}
