use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;

use crate::document::Document;
use crate::loaders::{fetch_text, http_client, DocumentLoader, LoaderError};

const GITHUB_API: &str = "https://api.github.com";
const TOKEN_ENV: &str = "GITHUB_ACCESS_TOKEN";

/// Extensions treated as binary; such files are handled per [`UnknownHandling`].
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "pdf", "zip", "gz", "tgz", "tar",
    "xz", "7z", "rar", "jar", "class", "exe", "dll", "so", "dylib", "bin", "wasm", "woff",
    "woff2", "ttf", "otf", "eot", "mp3", "mp4", "mov", "avi", "wav", "ogg", "psd",
];

/// What to do with files that look binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownHandling {
    Ignore,
    #[default]
    Warn,
    Error,
}

impl std::str::FromStr for UnknownHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown handling: {} (use ignore, warn, or error)", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

/// Loads files of a GitHub repository through the REST contents API.
///
/// Lists the root (and, when `recursive`, every subdirectory) at `branch`, then fetches
/// file bodies with at most `max_concurrency` requests in flight. One document per file,
/// sorted by path; metadata `source` (repo-relative path), `repository`, `branch`.
#[derive(Debug, Clone)]
pub struct GithubRepoLoader {
    repo_url: String,
    owner: String,
    repo: String,
    branch: String,
    recursive: bool,
    unknown: UnknownHandling,
    max_concurrency: usize,
    ignore_paths: Vec<String>,
    access_token: Option<String>,
    api_base: String,
}

impl GithubRepoLoader {
    /// `repo_url` like `https://github.com/owner/repo`. Token from `GITHUB_ACCESS_TOKEN`.
    pub fn new(repo_url: impl Into<String>) -> Result<Self, LoaderError> {
        let repo_url = repo_url.into();
        let (owner, repo) = parse_repo_url(&repo_url)?;
        Ok(Self {
            repo_url,
            owner,
            repo,
            branch: "main".to_string(),
            recursive: false,
            unknown: UnknownHandling::default(),
            max_concurrency: 5,
            ignore_paths: Vec::new(),
            access_token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            api_base: GITHUB_API.to_string(),
        })
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_unknown(mut self, unknown: UnknownHandling) -> Self {
        self.unknown = unknown;
        self
    }

    /// At least 1.
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Skips paths equal to or under any of `paths`.
    pub fn with_ignore_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    /// API root; defaults to `https://api.github.com`.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn is_ignored(&self, path: &str) -> bool {
        self.ignore_paths.iter().any(|p| {
            let p = p.trim_matches('/');
            path == p || path.starts_with(&format!("{}/", p))
        })
    }

    async fn list_dir(
        &self,
        client: &reqwest::Client,
        dir: &str,
    ) -> Result<Vec<ContentEntry>, LoaderError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base, self.owner, self.repo, dir, self.branch
        );
        let body = fetch_text(client, &url, self.access_token.as_deref()).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Breadth-first listing of the files to fetch.
    async fn list_files(&self, client: &reqwest::Client) -> Result<Vec<(String, String)>, LoaderError> {
        let mut files = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(dir) = pending.pop() {
            for entry in self.list_dir(client, &dir).await? {
                if self.is_ignored(&entry.path) {
                    continue;
                }
                match (entry.kind.as_str(), entry.download_url) {
                    ("dir", _) if self.recursive => pending.push(entry.path),
                    ("file", Some(url)) => {
                        if is_binary(&entry.path) {
                            match self.unknown {
                                UnknownHandling::Ignore => {}
                                UnknownHandling::Warn => {
                                    tracing::warn!(path = %entry.path, "skipping binary file");
                                }
                                UnknownHandling::Error => {
                                    return Err(LoaderError::UnknownFileType(entry.path));
                                }
                            }
                            continue;
                        }
                        files.push((entry.path, url));
                    }
                    _ => {}
                }
            }
        }
        Ok(files)
    }
}

fn is_binary(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn parse_repo_url(repo_url: &str) -> Result<(String, String), LoaderError> {
    let invalid = || LoaderError::InvalidUrl(format!("not a GitHub repository url: {}", repo_url));
    let url = url::Url::parse(repo_url).map_err(|_| invalid())?;
    let mut segments = url.path_segments().ok_or_else(invalid)?.filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Ok((owner.to_string(), repo.to_string()))
}

#[async_trait]
impl DocumentLoader for GithubRepoLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let client = http_client()?;
        let files = self.list_files(&client).await?;
        tracing::debug!(repo = %self.repo_url, files = files.len(), "listed repository");

        let token = self.access_token.as_deref();
        let client = &client;
        let mut docs: Vec<Document> = stream::iter(files)
            .map(|(path, url)| async move {
                let body = fetch_text(client, &url, token).await?;
                Ok::<_, LoaderError>(
                    Document::new(body)
                        .with_metadata("source", path)
                        .with_metadata("repository", self.repo_url.clone())
                        .with_metadata("branch", self.branch.clone()),
                )
            })
            .buffer_unordered(self.max_concurrency)
            .try_collect()
            .await?;
        docs.sort_by(|a, b| a.source().cmp(&b.source()));
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_repo(server: &MockServer) {
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contents/"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"path": "README.md", "type": "file", "download_url": format!("{}/raw/README.md", base)},
                {"path": "logo.png", "type": "file", "download_url": format!("{}/raw/logo.png", base)},
                {"path": "src", "type": "dir", "download_url": null},
                {"path": "docs", "type": "dir", "download_url": null}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contents/src"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"path": "src/lib.rs", "type": "file", "download_url": format!("{}/raw/src/lib.rs", base)}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contents/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"path": "docs/guide.md", "type": "file", "download_url": format!("{}/raw/docs/guide.md", base)}
            ])))
            .mount(server)
            .await;
        for (p, body) in [
            ("/raw/README.md", "# Widgets"),
            ("/raw/src/lib.rs", "pub fn widget() {}"),
            ("/raw/docs/guide.md", "guide"),
        ] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
    }

    fn loader(server: &MockServer) -> GithubRepoLoader {
        GithubRepoLoader::new("https://github.com/acme/widgets.git")
            .unwrap()
            .with_access_token(None)
            .with_api_base(server.uri())
    }

    /// **Scenario**: non-recursive load takes root text files and skips binaries.
    #[tokio::test]
    async fn root_files_only() {
        let server = MockServer::start().await;
        mock_repo(&server).await;
        let docs = loader(&server).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source(), Some("README.md"));
        assert_eq!(docs[0].page_content, "# Widgets");
        assert_eq!(docs[0].metadata["branch"], "main");
    }

    /// **Scenario**: recursive load walks directories, honors ignore paths, sorts by path.
    #[tokio::test]
    async fn recursive_with_ignores() {
        let server = MockServer::start().await;
        mock_repo(&server).await;
        let docs = loader(&server)
            .with_recursive(true)
            .with_max_concurrency(2)
            .with_ignore_paths(["docs"])
            .load()
            .await
            .unwrap();
        let paths: Vec<&str> = docs.iter().filter_map(|d| d.source()).collect();
        assert_eq!(paths, vec!["README.md", "src/lib.rs"]);
    }

    #[tokio::test]
    async fn unknown_error_mode_fails_on_binary() {
        let server = MockServer::start().await;
        mock_repo(&server).await;
        let result = loader(&server).with_unknown(UnknownHandling::Error).load().await;
        assert!(matches!(result, Err(LoaderError::UnknownFileType(p)) if p == "logo.png"));
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contents/"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let docs = loader(&server)
            .with_access_token(Some("s3cret".into()))
            .load()
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn repo_url_parsing() {
        assert_eq!(
            parse_repo_url("https://github.com/langchain-ai/langchainjs").unwrap(),
            ("langchain-ai".to_string(), "langchainjs".to_string())
        );
        assert!(parse_repo_url("https://github.com/only-owner").is_err());
        assert!(parse_repo_url("nope").is_err());
        assert_eq!("WARN".parse::<UnknownHandling>(), Ok(UnknownHandling::Warn));
    }
}
