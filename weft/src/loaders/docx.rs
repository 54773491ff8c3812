use std::io::{Cursor, Read};
use std::path::PathBuf;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::document::Document;
use crate::loaders::{DocumentLoader, LoaderError};

const DOCUMENT_XML: &str = "word/document.xml";

/// Paragraph text of a `.docx` file as one document, paragraphs separated by a blank line;
/// metadata `source`.
#[derive(Debug, Clone)]
pub struct DocxLoader {
    path: PathBuf,
}

impl DocxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Reads `word/document.xml` out of the zip container.
fn document_xml(bytes: Vec<u8>) -> Result<String, LoaderError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| LoaderError::Docx(e.to_string()))?;
    let mut entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| LoaderError::Docx(format!("{}: {}", DOCUMENT_XML, e)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| LoaderError::Docx(e.to_string()))?;
    Ok(xml)
}

/// Text runs (`w:t`) joined per paragraph (`w:p`); tabs and breaks kept.
pub(crate) fn paragraphs_text(xml: &str) -> Result<String, LoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;
    loop {
        match reader
            .read_event()
            .map_err(|e| LoaderError::Xml(e.to_string()))?
        {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    let text = paragraph.trim_end();
                    if !text.is_empty() {
                        if !out.is_empty() {
                            out.push_str("\n\n");
                        }
                        out.push_str(text);
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| LoaderError::Xml(e.to_string()))?;
                paragraph.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

#[async_trait]
impl DocumentLoader for DocxLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoaderError::io(&self.path, e))?;
        let xml = document_xml(bytes)?;
        let text = paragraphs_text(&xml)?;
        Ok(vec![
            Document::new(text).with_metadata("source", self.path.display().to_string())
        ])
    }
}
