use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;

use crate::document::Document;
use crate::loaders::{fetch_text, http_client, DocumentLoader, LoaderError};

const YOUTUBE_BASE: &str = "https://www.youtube.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
}

/// Transcript of a YouTube video as one document.
///
/// Reads the caption track list embedded in the watch page, picks the track for
/// `language` and loads its timed-text XML. Metadata `source` (video id) and, with
/// `add_video_info`, `title` and `author`.
#[derive(Debug, Clone)]
pub struct YoutubeLoader {
    video_id: String,
    language: String,
    add_video_info: bool,
    base_url: String,
}

impl YoutubeLoader {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            language: "en".to_string(),
            add_video_info: false,
            base_url: YOUTUBE_BASE.to_string(),
        }
    }

    /// Accepts `watch?v=`, `youtu.be/`, `embed/` and `shorts/` URLs.
    pub fn from_url(url: &str) -> Result<Self, LoaderError> {
        Ok(Self::new(extract_video_id(url)?))
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_video_info(mut self, add: bool) -> Self {
        self.add_video_info = add;
        self
    }

    /// Site root; defaults to `https://www.youtube.com`.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    fn pick_track(&self, page: &str) -> Result<CaptionTrack, LoaderError> {
        let raw = extract_json_array(page, "\"captionTracks\":")
            .ok_or_else(|| LoaderError::NotFound(format!("captions for video {}", self.video_id)))?;
        let tracks: Vec<CaptionTrack> = serde_json::from_str(raw)?;
        tracks
            .into_iter()
            .find(|t| t.language_code == self.language)
            .ok_or_else(|| {
                LoaderError::NotFound(format!(
                    "{} captions for video {}",
                    self.language, self.video_id
                ))
            })
    }
}

fn extract_video_id(url: &str) -> Result<String, LoaderError> {
    let invalid = || LoaderError::InvalidUrl(format!("not a YouTube video url: {}", url));
    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    let host = parsed.host_str().unwrap_or_default();
    let id = if host.ends_with("youtu.be") {
        parsed.path().trim_start_matches('/').to_string()
    } else if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        v.into_owned()
    } else {
        let path = parsed.path();
        ["/embed/", "/shorts/", "/v/"]
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix))
            .unwrap_or_default()
            .to_string()
    };
    let id = id.split('/').next().unwrap_or_default().to_string();
    if id.is_empty() {
        return Err(invalid());
    }
    Ok(id)
}

/// The JSON array following `key` in `text`, matched by bracket depth.
fn extract_json_array<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let start = text.find(key)? + key.len();
    let rest = &text[start..];
    let open = rest.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest[open..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[open..open + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Caption text joined with spaces. Caption bodies are often entity-escaped twice.
fn transcript_text(xml: &str) -> Result<String, LoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut parts = Vec::new();
    let mut in_text = false;
    loop {
        match reader
            .read_event()
            .map_err(|e| LoaderError::Xml(e.to_string()))?
        {
            Event::Start(e) if e.name().as_ref() == b"text" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"text" => in_text = false,
            Event::Text(t) if in_text => {
                let once = t.unescape().map_err(|e| LoaderError::Xml(e.to_string()))?;
                let text = once
                    .replace("&#39;", "'")
                    .replace("&quot;", "\"")
                    .replace("&amp;", "&")
                    .replace('\n', " ");
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parts.join(" "))
}

fn video_info(page: &str) -> (Option<String>, Option<String>) {
    let capture = |pattern: &str| {
        Regex::new(pattern)
            .ok()
            .and_then(|re| re.captures(page).and_then(|c| c.get(1)))
            .map(|m| m.as_str().to_string())
    };
    let title = capture(r#"<meta name="title" content="([^"]*)""#);
    let author = capture(r#""author":"([^"]*)""#);
    (title, author)
}

#[async_trait]
impl DocumentLoader for YoutubeLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let client = http_client()?;
        let watch_url = format!("{}/watch?v={}", self.base_url, self.video_id);
        let page = fetch_text(&client, &watch_url, None).await?;
        let track = self.pick_track(&page)?;
        let xml = fetch_text(&client, &track.base_url, None).await?;
        let text = transcript_text(&xml)?;
        tracing::debug!(video = %self.video_id, language = %self.language, chars = text.len(), "loaded transcript");

        let mut doc = Document::new(text).with_metadata("source", self.video_id.clone());
        if self.add_video_info {
            let (title, author) = video_info(&page);
            if let Some(title) = title {
                doc = doc.with_metadata("title", title);
            }
            if let Some(author) = author {
                doc = doc.with_metadata("author", author);
            }
        }
        Ok(vec![doc])
    }
}
