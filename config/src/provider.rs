//! OpenAI-compatible provider presets.
//!
//! Every supported vendor exposes an OpenAI-style REST surface; a preset names the base URL,
//! the environment variable that carries the API key and the default chat/embedding models.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Selects the provider when no name is passed explicitly.
pub const PROVIDER_ENV: &str = "WEFT_PROVIDER";
/// Overrides the preset chat model.
pub const MODEL_ENV: &str = "WEFT_MODEL";
/// Overrides the preset embedding model.
pub const EMBEDDING_MODEL_ENV: &str = "WEFT_EMBEDDING_MODEL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("unknown provider: {0} (expected openai, groq, mistral, gemini or cohere)")]
    Unknown(String),
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),
    #[error("{0} has no embedding model; set WEFT_EMBEDDING_MODEL or pick another provider")]
    NoEmbeddingModel(Provider),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Groq,
    Mistral,
    Gemini,
    Cohere,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAI,
        Provider::Groq,
        Provider::Mistral,
        Provider::Gemini,
        Provider::Cohere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::Gemini => "gemini",
            Provider::Cohere => "cohere",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::Cohere => "https://api.cohere.ai/compatibility/v1",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::Cohere => "COHERE_API_KEY",
        }
    }

    pub fn default_chat_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::Mistral => "mistral-large-latest",
            Provider::Gemini => "gemini-1.5-flash",
            Provider::Cohere => "command-r-plus",
        }
    }

    /// `None` for providers without an embeddings endpoint (Groq).
    pub fn default_embedding_model(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("text-embedding-3-small"),
            Provider::Groq => None,
            Provider::Mistral => Some("mistral-embed"),
            Provider::Gemini => Some("text-embedding-004"),
            Provider::Cohere => Some("embed-english-v3.0"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "groq" => Ok(Provider::Groq),
            "mistral" | "mistralai" => Ok(Provider::Mistral),
            "gemini" | "google" => Ok(Provider::Gemini),
            "cohere" => Ok(Provider::Cohere),
            _ => Err(ProviderError::Unknown(s.to_string())),
        }
    }
}

/// Resolved connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub base_url: String,
    pub api_key_env: &'static str,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: Option<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ProviderSettings {
    /// Preset values only; the environment is not consulted.
    pub fn preset(provider: Provider) -> Self {
        Self {
            provider,
            base_url: provider.base_url().to_string(),
            api_key_env: provider.api_key_env(),
            api_key: None,
            chat_model: provider.default_chat_model().to_string(),
            embedding_model: provider.default_embedding_model().map(str::to_string),
        }
    }

    /// Resolves `name` (or `WEFT_PROVIDER`, default `openai`), then applies `WEFT_MODEL`,
    /// `WEFT_EMBEDDING_MODEL` and the provider's API key variable from the environment.
    ///
    /// Call after [`crate::load_and_apply`] so `.env` and XDG values are visible.
    pub fn resolve(name: Option<&str>) -> Result<Self, ProviderError> {
        let provider = match name.map(str::to_string).or_else(|| non_empty_var(PROVIDER_ENV)) {
            Some(n) => n.parse()?,
            None => Provider::OpenAI,
        };
        let mut settings = Self::preset(provider);
        settings.api_key = non_empty_var(settings.api_key_env);
        if let Some(model) = non_empty_var(MODEL_ENV) {
            settings.chat_model = model;
        }
        if let Some(model) = non_empty_var(EMBEDDING_MODEL_ENV) {
            settings.embedding_model = Some(model);
        }
        Ok(settings)
    }

    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn require_api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(self.api_key_env))
    }

    pub fn require_embedding_model(&self) -> Result<&str, ProviderError> {
        self.embedding_model
            .as_deref()
            .ok_or(ProviderError::NoEmbeddingModel(self.provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (k.to_string(), env::var(k).ok()))
            .collect();
        for (k, v) in vars {
            match v {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
        let out = f();
        for (k, v) in prev {
            match v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
        out
    }

    /// **Scenario**: names parse case-insensitively, aliases included; unknown names error.
    #[test]
    fn provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::OpenAI));
        assert_eq!(" groq ".parse::<Provider>(), Ok(Provider::Groq));
        assert_eq!("google".parse::<Provider>(), Ok(Provider::Gemini));
        assert_eq!(
            "anthropic".parse::<Provider>(),
            Err(ProviderError::Unknown("anthropic".into()))
        );
        for p in Provider::ALL {
            assert_eq!(p.as_str().parse::<Provider>(), Ok(p));
        }
    }

    /// **Scenario**: presets carry the vendor's compatibility endpoint and key variable.
    #[test]
    fn presets() {
        let groq = ProviderSettings::preset(Provider::Groq);
        assert_eq!(groq.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(groq.api_key_env, "GROQ_API_KEY");
        assert_eq!(groq.chat_model, "llama-3.3-70b-versatile");
        assert_eq!(
            groq.require_embedding_model(),
            Err(ProviderError::NoEmbeddingModel(Provider::Groq))
        );

        let mistral = ProviderSettings::preset(Provider::Mistral);
        assert_eq!(mistral.embedding_model.as_deref(), Some("mistral-embed"));
        let gemini = ProviderSettings::preset(Provider::Gemini);
        assert_eq!(gemini.api_key_env, "GOOGLE_API_KEY");
    }

    /// **Scenario**: with nothing set, resolve falls back to OpenAI and reports the missing key.
    #[test]
    fn resolve_defaults_to_openai() {
        let s = with_env(
            &[
                (PROVIDER_ENV, None),
                (MODEL_ENV, None),
                (EMBEDDING_MODEL_ENV, None),
                ("OPENAI_API_KEY", None),
            ],
            || ProviderSettings::resolve(None),
        )
        .unwrap();
        assert_eq!(s.provider, Provider::OpenAI);
        assert_eq!(s.chat_model, "gpt-4o-mini");
        assert_eq!(
            s.require_api_key(),
            Err(ProviderError::MissingApiKey("OPENAI_API_KEY"))
        );
    }

    /// **Scenario**: WEFT_PROVIDER, WEFT_MODEL and the vendor key are read from the env.
    #[test]
    fn resolve_reads_environment() {
        let s = with_env(
            &[
                (PROVIDER_ENV, Some("cohere")),
                (MODEL_ENV, Some("command-r")),
                (EMBEDDING_MODEL_ENV, Some("embed-v4.0")),
                ("COHERE_API_KEY", Some("co-test")),
            ],
            || ProviderSettings::resolve(None),
        )
        .unwrap();
        assert_eq!(s.provider, Provider::Cohere);
        assert_eq!(s.chat_model, "command-r");
        assert_eq!(s.embedding_model.as_deref(), Some("embed-v4.0"));
        assert_eq!(s.require_api_key(), Ok("co-test"));
    }

    /// **Scenario**: an explicit name beats WEFT_PROVIDER; a bad name is an error.
    #[test]
    fn resolve_explicit_name() {
        let s = with_env(&[(PROVIDER_ENV, Some("groq")), (MODEL_ENV, None)], || {
            ProviderSettings::resolve(Some("mistral"))
        })
        .unwrap();
        assert_eq!(s.provider, Provider::Mistral);

        let err = with_env(&[], || ProviderSettings::resolve(Some("nope"))).unwrap_err();
        assert_eq!(err, ProviderError::Unknown("nope".into()));
    }
}
