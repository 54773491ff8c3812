use std::path::PathBuf;

use async_trait::async_trait;

use crate::document::Document;
use crate::loaders::{DocumentLoader, LoaderError};

/// One document per CSV row.
///
/// Content is `header: value` lines, or only the chosen column's value. Metadata
/// `source` and `line` (1-based row index, header excluded).
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
    delimiter: u8,
    column: Option<String>,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            column: None,
        }
    }

    /// Field separator; must be one ASCII character.
    pub fn with_separator(mut self, separator: char) -> Result<Self, LoaderError> {
        if !separator.is_ascii() {
            return Err(LoaderError::Config(format!(
                "csv separator must be ASCII, got {:?}",
                separator
            )));
        }
        self.delimiter = separator as u8;
        Ok(self)
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Document>, LoaderError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(bytes);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let column_index = match &self.column {
            Some(column) => Some(
                headers
                    .iter()
                    .position(|h| h == column)
                    .ok_or_else(|| LoaderError::NotFound(format!("column {} in csv", column)))?,
            ),
            None => None,
        };
        let source = self.path.display().to_string();

        let mut docs = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let content = match column_index {
                Some(idx) => record.get(idx).unwrap_or_default().trim().to_string(),
                None => headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| format!("{}: {}", h, v.trim()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            docs.push(
                Document::new(content)
                    .with_metadata("source", source.clone())
                    .with_metadata("line", i + 1),
            );
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentLoader for CsvLoader {
    async fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoaderError::io(&self.path, e))?;
        self.parse(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    /// **Scenario**: each row becomes `key: value` lines with a 1-based line number.
    #[tokio::test]
    async fn rows_as_key_value_lines() {
        let f = csv_file("name,department\nAda,Research\nGrace,Compilers\n");
        let docs = CsvLoader::new(f.path()).load().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].page_content, "name: Grace\ndepartment: Compilers");
        assert_eq!(docs[1].metadata["line"], 2);
        assert_eq!(docs[1].source(), Some(f.path().display().to_string().as_str()));
    }

    #[tokio::test]
    async fn separator_and_column() {
        let f = csv_file("name|department\nAda|Research\n");
        let docs = CsvLoader::new(f.path())
            .with_separator('|')
            .unwrap()
            .with_column("department")
            .load()
            .await
            .unwrap();
        assert_eq!(docs[0].page_content, "Research");

        let missing = CsvLoader::new(f.path())
            .with_separator('|')
            .unwrap()
            .with_column("salary")
            .load()
            .await;
        assert!(matches!(missing, Err(LoaderError::NotFound(_))));
        assert!(CsvLoader::new(f.path()).with_separator('§').is_err());
    }
}
