use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::output_parsers::{strip_code_fence, OutputParser, ParseError};

type Validator = Arc<dyn Fn(&Value) -> Result<(), ParseError> + Send + Sync>;

/// Parses a JSON object described by a JSON schema.
///
/// Built either from `name -> description` pairs (every key a required string) or from a
/// Rust type deriving `JsonSchema`, in which case output must deserialize into that type.
#[derive(Clone)]
pub struct StructuredOutputParser {
    schema: Value,
    validator: Validator,
}

impl fmt::Debug for StructuredOutputParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredOutputParser")
            .field("schema", &self.schema)
            .finish()
    }
}

impl StructuredOutputParser {
    pub fn from_names_and_descriptions<I, K, D>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, description) in fields {
            let name = name.into();
            properties.insert(
                name.clone(),
                json!({ "type": "string", "description": description.into() }),
            );
            required.push(name);
        }
        let schema = json!({
            "type": "object",
            "properties": properties,
            "required": required.clone(),
            "additionalProperties": false,
        });
        let validator: Validator = Arc::new(move |value: &Value| {
            let obj = value
                .as_object()
                .ok_or_else(|| ParseError::NotAnObject(value.to_string()))?;
            for key in &required {
                if !obj.contains_key(key) {
                    return Err(ParseError::MissingKey(key.clone()));
                }
            }
            Ok(())
        });
        Self { schema, validator }
    }

    pub fn from_schema<T>() -> Self
    where
        T: JsonSchema + DeserializeOwned + 'static,
    {
        let schema = schemars::schema_for!(T).to_value();
        let validator: Validator = Arc::new(|value: &Value| {
            serde_json::from_value::<T>(value.clone())
                .map(|_| ())
                .map_err(|e| ParseError::Schema(e.to_string()))
        });
        Self { schema, validator }
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Parses and deserializes into `T`.
    pub fn parse_into<T: DeserializeOwned>(&self, text: &str) -> Result<T, ParseError> {
        let value = self.parse(text)?;
        serde_json::from_value(value).map_err(|e| ParseError::Schema(e.to_string()))
    }
}

impl OutputParser for StructuredOutputParser {
    type Output = Value;

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let value: Value = serde_json::from_str(strip_code_fence(text))?;
        (self.validator)(&value)?;
        Ok(value)
    }

    fn format_instructions(&self) -> String {
        let schema = serde_json::to_string(&self.schema).unwrap_or_default();
        format!(
            "You must format your output as a JSON value that adheres to the JSON Schema below.\n\
             Return only the JSON object, wrapped in a ```json code fence, with no other text.\n\n\
             ```json\n{}\n```\n",
            schema
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    /// **Scenario**: names-and-descriptions parser requires every key.
    #[test]
    fn names_and_descriptions() {
        let p = StructuredOutputParser::from_names_and_descriptions([
            ("name", "the name of the person"),
            ("age", "the age of the person"),
            ("gender", "the gender of the person male/female"),
        ]);
        let out = p
            .parse("```json\n{\"name\": \"Omar\", \"age\": \"24\", \"gender\": \"male\"}\n```")
            .unwrap();
        assert_eq!(out["name"], "Omar");
        assert!(matches!(
            p.parse("{\"name\": \"Omar\"}"),
            Err(ParseError::MissingKey(k)) if k == "age"
        ));
        assert!(matches!(p.parse("[1]"), Err(ParseError::NotAnObject(_))));
        let instructions = p.format_instructions();
        assert!(instructions.contains("```json"));
        assert!(instructions.contains("the age of the person"));
    }

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Recipe {
        /// name of the recipe
        recipe: String,
        /// components of the recipe
        components: Vec<String>,
    }

    /// **Scenario**: schema parser validates by deserializing into the type.
    #[test]
    fn from_schema_validates_type() {
        let p = StructuredOutputParser::from_schema::<Recipe>();
        assert_eq!(p.schema()["properties"]["components"]["type"], "array");
        let recipe: Recipe = p
            .parse_into(r#"{"recipe": "cake", "components": ["flour", "eggs"]}"#)
            .unwrap();
        assert_eq!(recipe.components, vec!["flour", "eggs"]);
        assert!(matches!(
            p.parse(r#"{"recipe": "cake", "components": "flour"}"#),
            Err(ParseError::Schema(_))
        ));
        assert!(p.format_instructions().contains("components of the recipe"));
    }
}
