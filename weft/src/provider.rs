//! Builds chat and embedding clients from resolved [`ProviderSettings`].

use async_openai::config::OpenAIConfig;

pub use env_config::{Provider, ProviderError, ProviderSettings};

use crate::embeddings::OpenAIEmbedder;
use crate::llm::ChatOpenAI;

/// Client config pointing at the provider's compatibility endpoint. Fails when the key is unset.
pub fn openai_config(settings: &ProviderSettings) -> Result<OpenAIConfig, ProviderError> {
    let key = settings.require_api_key()?;
    Ok(OpenAIConfig::new()
        .with_api_base(settings.base_url.trim_end_matches('/'))
        .with_api_key(key))
}

/// Chat client for `settings.chat_model`.
pub fn chat_model(settings: &ProviderSettings) -> Result<ChatOpenAI, ProviderError> {
    let config = openai_config(settings)?;
    tracing::debug!(provider = %settings.provider, model = %settings.chat_model, "chat model");
    Ok(ChatOpenAI::with_config(config, settings.chat_model.clone()))
}

/// Embedding client for `settings.embedding_model`.
pub fn embedder(settings: &ProviderSettings) -> Result<OpenAIEmbedder, ProviderError> {
    let model = settings.require_embedding_model()?.to_string();
    let config = openai_config(settings)?;
    tracing::debug!(provider = %settings.provider, model = %model, "embedding model");
    Ok(OpenAIEmbedder::with_config(config, model))
}
