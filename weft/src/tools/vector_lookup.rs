//! Similarity lookup over an in-memory vector store, exposed as a tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::tools::r#trait::{Tool, ToolCallContent, ToolError, ToolSpec};
use crate::vectorstore::InMemoryVectorStore;

const DEFAULT_N: usize = 10;

/// `n` arrives as any JSON number or null; models often send `5.0` for integers.
#[derive(Debug, Deserialize)]
struct LookupArgs {
    query: String,
    #[serde(default)]
    n: Option<f64>,
}

impl LookupArgs {
    fn limit(&self) -> usize {
        match self.n {
            Some(n) if n.is_finite() && n >= 1.0 => n.round() as usize,
            Some(_) => 1,
            None => DEFAULT_N,
        }
    }
}

/// Runs `similarity_search_with_score(query, n)` and returns the hits as a JSON array of
/// `{ page_content, metadata, score }`.
pub struct VectorLookupTool {
    name: String,
    description: String,
    store: Arc<InMemoryVectorStore>,
}

impl VectorLookupTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        store: Arc<InMemoryVectorStore>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            store,
        }
    }

    /// The HR demo's lookup: `employee_lookup` over employee records.
    pub fn employee_lookup(store: Arc<InMemoryVectorStore>) -> Self {
        Self::new(
            "employee_lookup",
            "Gathers employee details from the HR database",
            store,
        )
    }
}

#[async_trait]
impl Tool for VectorLookupTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "The search query" },
                    "n": {
                        "type": "number",
                        "description": "Number of results to return",
                        "default": DEFAULT_N
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolError> {
        let args: LookupArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        let hits = self
            .store
            .similarity_search_with_score(&args.query, args.limit())
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        tracing::debug!(tool = %self.name, query = %args.query, hits = hits.len(), "vector lookup");
        let rows: Vec<Value> = hits
            .into_iter()
            .map(|(doc, score)| {
                json!({
                    "page_content": doc.page_content,
                    "metadata": doc.metadata,
                    "score": score,
                })
            })
            .collect();
        let text = serde_json::to_string(&rows).map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(ToolCallContent { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::embeddings::HashEmbedder;

    async fn store() -> Arc<InMemoryVectorStore> {
        let docs = vec![
            Document::new("name: Ada\ndepartment: Research").with_metadata("line", 1),
            Document::new("name: Grace\ndepartment: Compilers").with_metadata("line", 2),
            Document::new("name: Alan\ndepartment: Cryptography").with_metadata("line", 3),
        ];
        Arc::new(
            InMemoryVectorStore::from_documents(docs, Arc::new(HashEmbedder::default()))
                .await
                .unwrap(),
        )
    }

    /// **Scenario**: n limits the hits; each hit carries content, metadata and score.
    #[tokio::test]
    async fn lookup_returns_scored_rows() {
        let tool = VectorLookupTool::employee_lookup(store().await);
        assert_eq!(tool.name(), "employee_lookup");
        let out = tool
            .call(json!({"query": "Grace Compilers", "n": 2}))
            .await
            .unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0]["page_content"].as_str().unwrap().contains("Grace"));
        assert_eq!(rows[0]["metadata"]["line"], 2);
        assert!(rows[0]["score"].is_number());
    }

    /// **Scenario**: n defaults to 10, capped by store size; query is required.
    #[tokio::test]
    async fn default_n_and_missing_query() {
        let tool = VectorLookupTool::employee_lookup(store().await);
        let out = tool.call(json!({"query": "anyone"})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(matches!(
            tool.call(json!({"n": 1})).await,
            Err(ToolError::InvalidInput(_))
        ));
    }

    /// **Scenario**: null n falls back to the default; float n is rounded.
    #[tokio::test]
    async fn null_and_float_n_are_accepted() {
        let tool = VectorLookupTool::employee_lookup(store().await);

        let out = tool.call(json!({"query": "Ada", "n": null})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(rows.len(), 3);

        let out = tool.call(json!({"query": "Ada", "n": 2.0})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(rows.len(), 2);

        let out = tool.call(json!({"query": "Ada", "n": 0.4})).await.unwrap();
        let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn spec_requires_query() {
        let store = Arc::new(InMemoryVectorStore::new(Arc::new(HashEmbedder::new(8))));
        let spec = VectorLookupTool::new("lookup", "d", store).spec();
        assert_eq!(spec.input_schema["required"], json!(["query"]));
        assert_eq!(spec.input_schema["properties"]["n"]["default"], 10);
    }
}
