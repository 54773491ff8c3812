//! Document loaders.
//!
//! Each loader turns one external source into [`Document`]s: local files (text, CSV,
//! JSON, DOCX), web pages, GitHub repositories and YouTube transcripts. Use
//! [`load_safely`] when a failure should be reported as data rather than propagated.

mod csv;
mod docx;
mod github;
mod json;
mod text;
mod web;
mod youtube;

pub use self::csv::CsvLoader;
pub use docx::DocxLoader;
pub use github::{GithubRepoLoader, UnknownHandling};
pub use json::JsonLoader;
pub use text::TextLoader;
pub use web::WebLoader;
pub use youtube::YoutubeLoader;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::document::Document;
use crate::text_splitter::RecursiveCharacterTextSplitter;

const USER_AGENT: &str = concat!("weft/", env!("CARGO_PKG_VERSION"));

/// Loader failures.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("docx: {0}")]
    Docx(String),
    #[error("xml: {0}")]
    Xml(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("invalid loader configuration: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown file type: {0}")]
    UnknownFileType(String),
}

impl LoaderError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LoaderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Converts one external source into documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<Document>, LoaderError>;

    /// Loads, then splits with `splitter`.
    async fn load_and_split(
        &self,
        splitter: &RecursiveCharacterTextSplitter,
    ) -> Result<Vec<Document>, LoaderError> {
        let docs = self.load().await?;
        Ok(splitter.split_documents(&docs))
    }
}

/// Outcome of [`load_safely`]: the documents, or the error message.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs `loader`, catching its error into the report.
pub async fn load_safely(loader: &dyn DocumentLoader) -> LoadReport {
    match loader.load().await {
        Ok(documents) => {
            tracing::debug!(count = documents.len(), "loaded documents");
            LoadReport {
                success: true,
                documents: Some(documents),
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "error loading documents");
            LoadReport {
                success: false,
                documents: None,
                error: Some(e.to_string()),
            }
        }
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, LoaderError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// GET `url` as text; non-2xx is `LoaderError::Status`.
pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
) -> Result<String, LoaderError> {
    let mut request = client.get(url);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoaderError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}
