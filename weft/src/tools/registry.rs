use std::collections::HashMap;

use crate::tools::r#trait::{Tool, ToolCallContent, ToolError, ToolSpec};

/// Registry of tools by name.
///
/// Registering a tool under an existing name replaces it. `list` is sorted by name so
/// the specs offered to the model are stable across calls.
///
/// # Examples
///
/// ```
/// use weft::tools::ToolRegistry;
///
/// let registry = ToolRegistry::new();
/// assert!(registry.list().is_empty());
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn list(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls the tool named `name`. Unknown names give `ToolError::NotFound`.
    pub async fn call(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<ToolCallContent, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "upper".into(),
                description: Some("Uppercases text".into()),
                input_schema: json!({"type": "object", "properties": {"text": {"type": "string"}}}),
            }
        }

        async fn call(&self, args: serde_json::Value) -> Result<ToolCallContent, ToolError> {
            let text = args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing text".into()))?;
            Ok(ToolCallContent::text(text.to_uppercase()))
        }
    }

    /// **Scenario**: a registered tool is listed and callable by name.
    #[tokio::test]
    async fn register_list_call() {
        let registry = ToolRegistry::new().with_tool(Box::new(Upper));
        let specs = registry.list();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "upper");
        let out = registry.call("upper", json!({"text": "hr"})).await.unwrap();
        assert_eq!(out.text, "HR");
    }

    /// **Scenario**: unknown names and bad arguments surface typed errors.
    #[tokio::test]
    async fn call_errors() {
        let registry = ToolRegistry::new().with_tool(Box::new(Upper));
        assert!(matches!(
            registry.call("nope", json!({})).await,
            Err(ToolError::NotFound(name)) if name == "nope"
        ));
        assert!(matches!(
            registry.call("upper", json!({})).await,
            Err(ToolError::InvalidInput(_))
        ));
    }
}
