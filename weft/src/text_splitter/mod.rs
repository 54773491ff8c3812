//! Recursive character text splitter.
//!
//! Splits on the first separator present in the text, recurses into pieces that are
//! still longer than `chunk_size` with the remaining separators, then merges adjacent
//! pieces back up to `chunk_size`, carrying up to `chunk_overlap` characters of trailing
//! pieces into the next chunk. Lengths are counted in chars.

use std::collections::VecDeque;

use serde_json::{json, Value};

use crate::document::{Document, Metadata};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splitter configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SplitterError {
    #[error("chunk_size must be greater than 0")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) is larger than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    keep_separator: bool,
}

impl Default for RecursiveCharacterTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
            keep_separator: true,
        }
    }
}

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterError> {
        if chunk_size == 0 {
            return Err(SplitterError::ZeroChunkSize);
        }
        if chunk_overlap > chunk_size {
            return Err(SplitterError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        })
    }

    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// When true (default) each separator stays attached to the start of the piece after it.
    pub fn with_keep_separator(mut self, keep: bool) -> Self {
        self.keep_separator = keep;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// One document per chunk. Metadata is copied and `loc` gains `chunk` (index within
    /// the source document) and `lines { from, to }` (1-based) when the chunk is found.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();
        for doc in documents {
            let mut search_from = 0;
            for (i, chunk) in self.split_text(&doc.page_content).into_iter().enumerate() {
                let mut loc = match doc.metadata.get("loc") {
                    Some(Value::Object(obj)) => obj.clone(),
                    _ => serde_json::Map::new(),
                };
                loc.insert("chunk".into(), json!(i));
                if let Some(start) = doc.page_content[search_from..].find(chunk.as_str()) {
                    let start = search_from + start;
                    let from = doc.page_content[..start].matches('\n').count() + 1;
                    let to = from + chunk.matches('\n').count();
                    loc.insert("lines".into(), json!({ "from": from, "to": to }));
                    search_from = start + chunk.chars().next().map_or(1, char::len_utf8);
                }
                let mut metadata: Metadata = doc.metadata.clone();
                metadata.insert("loc".into(), Value::Object(loc));
                out.push(Document {
                    page_content: chunk,
                    metadata,
                });
            }
        }
        tracing::debug!(input = documents.len(), chunks = out.len(), "split documents");
        out
    }

    /// Documents from raw texts; `metadatas` pairs up by index when given.
    pub fn create_documents(&self, texts: &[&str], metadatas: Option<&[Metadata]>) -> Vec<Document> {
        let docs: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                page_content: text.to_string(),
                metadata: metadatas
                    .and_then(|m| m.get(i))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        self.split_documents(&docs)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut rest: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                rest = &separators[i + 1..];
                break;
            }
        }

        let splits = self.split_on(text, separator);
        let merge_separator = if self.keep_separator { "" } else { separator };

        let mut final_chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in splits {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                final_chunks.extend(self.merge_splits(&good, merge_separator));
                good.clear();
            }
            if rest.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, rest));
            }
        }
        if !good.is_empty() {
            final_chunks.extend(self.merge_splits(&good, merge_separator));
        }
        final_chunks
    }

    fn split_on<'a>(&self, text: &'a str, separator: &str) -> Vec<&'a str> {
        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else if self.keep_separator {
            let mut out = Vec::new();
            let mut last = 0;
            for (idx, _) in text.match_indices(separator) {
                out.push(&text[last..idx]);
                last = idx;
            }
            out.push(&text[last..]);
            out
        } else {
            text.split(separator).collect()
        };
        pieces.into_iter().filter(|p| !p.is_empty()).collect()
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            let joined_sep = if current.is_empty() { 0 } else { sep_len };
            if total + len + joined_sep > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        size = total,
                        chunk_size = self.chunk_size,
                        "created a chunk longer than chunk_size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current, separator) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap
                        || (total > 0
                            && total + len + if current.is_empty() { 0 } else { sep_len }
                                > self.chunk_size)
                    {
                        let Some((_, first_len)) = current.pop_front() else {
                            break;
                        };
                        total -= first_len + if current.is_empty() { 0 } else { sep_len };
                    }
                }
            }
            current.push_back((piece, len));
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }
        if let Some(doc) = join_pieces(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

fn join_pieces(pieces: &VecDeque<(&str, usize)>, separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .map(|(p, _)| *p)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
