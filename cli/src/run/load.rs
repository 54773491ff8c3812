//! `load <kind>`: run one loader and report `{ success, documents | error }`.

use std::path::Path;

use weft::loaders::{
    CsvLoader, DocxLoader, GithubRepoLoader, JsonLoader, TextLoader, UnknownHandling, WebLoader,
    YoutubeLoader,
};
use weft::{load_safely, DocumentLoader, LoadReport, LoaderError, RecursiveCharacterTextSplitter};

use crate::RunError;

/// Loader selection with its options, one variant per `load` subcommand.
#[derive(Debug, Clone)]
pub enum LoadKind {
    Text { path: String },
    Csv { path: String, separator: char, column: Option<String> },
    Json { path: String, pointer: Option<String> },
    Docx { path: String },
    Web { url: String, selector: String },
    Github { url: String, branch: String, recursive: bool, unknown: UnknownHandling },
    Youtube { url: String, language: String, video_info: bool },
}

impl LoadKind {
    fn into_loader(self) -> Result<Box<dyn DocumentLoader>, LoaderError> {
        Ok(match self {
            LoadKind::Text { path } => Box::new(TextLoader::new(path)),
            LoadKind::Csv { path, separator, column } => {
                let mut loader = CsvLoader::new(path).with_separator(separator)?;
                if let Some(column) = column {
                    loader = loader.with_column(column);
                }
                Box::new(loader)
            }
            LoadKind::Json { path, pointer } => {
                let loader = JsonLoader::new(path);
                Box::new(match pointer {
                    Some(p) => loader.with_pointer(p),
                    None => loader,
                })
            }
            LoadKind::Docx { path } => Box::new(DocxLoader::new(path)),
            LoadKind::Web { url, selector } => Box::new(WebLoader::new(url).with_selector(selector)),
            LoadKind::Github { url, branch, recursive, unknown } => Box::new(
                GithubRepoLoader::new(url)?
                    .with_branch(branch)
                    .with_recursive(recursive)
                    .with_unknown(unknown),
            ),
            LoadKind::Youtube { url, language, video_info } => Box::new(
                YoutubeLoader::from_url(&url)?
                    .with_language(language)
                    .with_video_info(video_info),
            ),
        })
    }
}

/// Picks a loader from a URL scheme or file extension (`txt`, `md`, `csv`, `json`, `docx`).
pub fn loader_for(source: &str) -> Result<Box<dyn DocumentLoader>, LoaderError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Ok(Box::new(WebLoader::new(source)));
    }
    let ext = Path::new(source)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "txt" | "md" => Box::new(TextLoader::new(source)),
        "csv" => Box::new(CsvLoader::new(source)),
        "json" => Box::new(JsonLoader::new(source)),
        "docx" => Box::new(DocxLoader::new(source)),
        _ => return Err(LoaderError::UnknownFileType(source.to_string())),
    })
}

/// Loads (and optionally splits) documents. Loader failures end up in the report;
/// only bad splitter settings are returned as an error.
pub async fn load(kind: LoadKind, chunk: Option<(usize, usize)>) -> Result<LoadReport, RunError> {
    let splitter = chunk
        .map(|(size, overlap)| RecursiveCharacterTextSplitter::new(size, overlap))
        .transpose()?;
    let loader = match kind.into_loader() {
        Ok(loader) => loader,
        Err(e) => {
            return Ok(LoadReport {
                success: false,
                documents: None,
                error: Some(e.to_string()),
            })
        }
    };
    let mut report = load_safely(loader.as_ref()).await;
    if let Some(splitter) = splitter {
        report.documents = report.documents.map(|docs| splitter.split_documents(&docs));
    }
    Ok(report)
}
