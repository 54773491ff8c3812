use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::document::Document;
use crate::loaders::{fetch_text, http_client, DocumentLoader, LoaderError};

const DEFAULT_SELECTOR: &str = "p";

/// Fetches a page and keeps the text of elements matching a CSS selector.
///
/// One document per page: matched elements' text, one per line. Metadata `source`
/// (the URL) and `title` when the page has one.
#[derive(Debug, Clone)]
pub struct WebLoader {
    url: String,
    selector: String,
}

impl WebLoader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Extracts (text, title). `Html` is not `Send`, so this stays synchronous.
    fn extract(&self, html: &str) -> Result<(String, Option<String>), LoaderError> {
        let selector =
            Selector::parse(&self.selector).map_err(|e| LoaderError::Selector(e.to_string()))?;
        let title_selector =
            Selector::parse("title").map_err(|e| LoaderError::Selector(e.to_string()))?;
        let document = Html::parse_document(html);

        let text = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let title = document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
        Ok((text, title))
    }
}

#[async_trait]
impl DocumentLoader for WebLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        url::Url::parse(&self.url).map_err(|e| LoaderError::InvalidUrl(format!("{}: {}", self.url, e)))?;
        let client = http_client()?;
        let html = fetch_text(&client, &self.url, None).await?;
        let (text, title) = self.extract(&html)?;
        tracing::debug!(url = %self.url, selector = %self.selector, chars = text.len(), "loaded web page");

        let mut doc = Document::new(text).with_metadata("source", self.url.clone());
        if let Some(title) = title {
            doc = doc.with_metadata("title", title);
        }
        Ok(vec![doc])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title> Show HN </title></head>
<body><div class="c">comment</div><p>First paragraph.</p><p> Second <b>bold</b> one. </p><p></p></body></html>"#;

    /// **Scenario**: default selector `p` keeps paragraph text, one per line, plus title.
    #[tokio::test]
    async fn loads_paragraphs_and_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/item"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let url = format!("{}/item", server.uri());
        let docs = WebLoader::new(&url).load().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "First paragraph.\nSecond bold one.");
        assert_eq!(docs[0].source(), Some(url.as_str()));
        assert_eq!(docs[0].metadata["title"], "Show HN");
    }

    #[tokio::test]
    async fn custom_selector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        let docs = WebLoader::new(server.uri())
            .with_selector("div.c")
            .load()
            .await
            .unwrap();
        assert_eq!(docs[0].page_content, "comment");
    }

    /// **Scenario**: HTTP errors, bad URLs and bad selectors are typed errors.
    #[tokio::test]
    async fn errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        assert!(matches!(
            WebLoader::new(server.uri()).load().await,
            Err(LoaderError::Status { status: 404, .. })
        ));
        assert!(matches!(
            WebLoader::new("not a url").load().await,
            Err(LoaderError::InvalidUrl(_))
        ));
        assert!(matches!(
            WebLoader::new("https://example.invalid").with_selector("p[").extract(PAGE),
            Err(LoaderError::Selector(_))
        ));
    }
}
