use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::document::Document;
use crate::message::Message;
use crate::prompts::PromptValue;
use crate::runnable::{format_documents, ChainError};

/// Value flowing between runnable steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunValue {
    #[default]
    Null,
    Text(String),
    Json(Value),
    Messages(Vec<Message>),
    Documents(Vec<Document>),
    Map(BTreeMap<String, RunValue>),
}

impl RunValue {
    pub fn kind(&self) -> &'static str {
        match self {
            RunValue::Null => "null",
            RunValue::Text(_) => "text",
            RunValue::Json(_) => "json",
            RunValue::Messages(_) => "messages",
            RunValue::Documents(_) => "documents",
            RunValue::Map(_) => "map",
        }
    }

    /// Map from `(key, value)` pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RunValue>,
    {
        RunValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RunValue::Text(s) => Some(s),
            RunValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&RunValue> {
        match self {
            RunValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Text content; a JSON string counts as text.
    pub fn into_text(self) -> Result<String, ChainError> {
        match self {
            RunValue::Text(s) => Ok(s),
            RunValue::Json(Value::String(s)) => Ok(s),
            other => Err(ChainError::unexpected("text", &other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            RunValue::Null => Value::Null,
            RunValue::Text(s) => Value::String(s.clone()),
            RunValue::Json(v) => v.clone(),
            RunValue::Messages(m) => serde_json::to_value(m).unwrap_or(Value::Null),
            RunValue::Documents(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            RunValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Value for a prompt variable: documents are joined, JSON is stringified.
    pub fn to_prompt_value(&self) -> PromptValue {
        match self {
            RunValue::Null => PromptValue::Text(String::new()),
            RunValue::Text(s) => PromptValue::Text(s.clone()),
            RunValue::Json(Value::String(s)) => PromptValue::Text(s.clone()),
            RunValue::Json(v) => PromptValue::Text(v.to_string()),
            RunValue::Messages(m) => PromptValue::Messages(m.clone()),
            RunValue::Documents(d) => PromptValue::Text(format_documents(d)),
            RunValue::Map(_) => PromptValue::Text(self.to_json().to_string()),
        }
    }
}

impl fmt::Display for RunValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunValue::Text(s) => f.write_str(s),
            other => {
                let pretty = serde_json::to_string_pretty(&other.to_json()).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}

impl From<&str> for RunValue {
    fn from(s: &str) -> Self {
        RunValue::Text(s.to_string())
    }
}

impl From<String> for RunValue {
    fn from(s: String) -> Self {
        RunValue::Text(s)
    }
}

impl From<Value> for RunValue {
    fn from(v: Value) -> Self {
        RunValue::Json(v)
    }
}

impl From<Vec<String>> for RunValue {
    fn from(items: Vec<String>) -> Self {
        RunValue::Json(Value::Array(items.into_iter().map(Value::String).collect()))
    }
}

impl From<Vec<Message>> for RunValue {
    fn from(m: Vec<Message>) -> Self {
        RunValue::Messages(m)
    }
}

impl From<Vec<Document>> for RunValue {
    fn from(d: Vec<Document>) -> Self {
        RunValue::Documents(d)
    }
}

impl From<BTreeMap<String, RunValue>> for RunValue {
    fn from(map: BTreeMap<String, RunValue>) -> Self {
        RunValue::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_json_nests_maps() {
        let v = RunValue::map([
            ("joke", RunValue::from("why")),
            ("n", RunValue::from(json!(3))),
        ]);
        assert_eq!(v.to_json(), json!({"joke": "why", "n": 3}));
        assert_eq!(v.get("n"), Some(&RunValue::Json(json!(3))));
        assert_eq!(v.kind(), "map");
    }

    #[test]
    fn into_text_accepts_json_string_only() {
        assert_eq!(RunValue::from(json!("x")).into_text().unwrap(), "x");
        assert!(RunValue::Null.into_text().is_err());
    }

    #[test]
    fn display_text_raw_others_pretty() {
        assert_eq!(RunValue::from("plain").to_string(), "plain");
        assert_eq!(
            RunValue::from(vec!["a".to_string(), "b".to_string()]).to_string(),
            "[\n  \"a\",\n  \"b\"\n]"
        );
    }
}
