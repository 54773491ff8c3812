use std::collections::BTreeMap;

use crate::prompts::{PromptError, PromptValues};

/// Variable syntax of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateFormat {
    /// `{name}`; `{{` and `}}` are literal braces.
    #[default]
    FString,
    /// `{{name}}`; single braces are literal.
    Mustache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// String template over named variables.
///
/// Input variables are inferred from the template in order of first appearance.
/// Partial variables are bound up front and no longer required by `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
    format: TemplateFormat,
    segments: Vec<Segment>,
    partials: BTreeMap<String, String>,
}

impl PromptTemplate {
    /// f-string template.
    pub fn from_template(template: impl Into<String>) -> Result<Self, PromptError> {
        Self::new(template, TemplateFormat::FString)
    }

    pub fn new(template: impl Into<String>, format: TemplateFormat) -> Result<Self, PromptError> {
        let template = template.into();
        let segments = match format {
            TemplateFormat::FString => parse_fstring(&template)?,
            TemplateFormat::Mustache => parse_mustache(&template)?,
        };
        Ok(Self {
            template,
            format,
            segments,
            partials: BTreeMap::new(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn template_format(&self) -> TemplateFormat {
        self.format
    }

    /// Binds `name` ahead of `format` (builder).
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.insert(name.into(), value.into());
        self
    }

    /// Variables `format` still needs: every template variable not bound as a partial.
    pub fn input_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for seg in &self.segments {
            if let Segment::Variable(name) = seg {
                if !self.partials.contains_key(name) && !vars.contains(name) {
                    vars.push(name.clone());
                }
            }
        }
        vars
    }

    /// Renders the template. Supplied values override partials.
    pub fn format(&self, values: &PromptValues) -> Result<String, PromptError> {
        let mut out = String::with_capacity(self.template.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Variable(name) => {
                    if let Some(value) = values.get(name) {
                        out.push_str(&value.to_text());
                    } else if let Some(value) = self.partials.get(name) {
                        out.push_str(value);
                    } else {
                        return Err(PromptError::MissingVariable(name.clone()));
                    }
                }
            }
        }
        Ok(out)
    }
}

fn push_literal(segments: &mut Vec<Segment>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn check_name(name: &str, template: &str) -> Result<String, PromptError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PromptError::InvalidTemplate(format!(
            "empty variable name in `{}`",
            template
        )));
    }
    Ok(name.to_string())
}

fn parse_fstring(template: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if c == '{' {
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(PromptError::InvalidTemplate(format!(
                        "unclosed `{{` in `{}`",
                        template
                    )));
                }
                push_literal(&mut segments, &mut literal);
                segments.push(Segment::Variable(check_name(&name, template)?));
            }
            '}' => {
                return Err(PromptError::InvalidTemplate(format!(
                    "single `}}` in `{}`",
                    template
                )));
            }
            c => literal.push(c),
        }
    }
    push_literal(&mut segments, &mut literal);
    Ok(segments)
}

fn parse_mustache(template: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        literal.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            PromptError::InvalidTemplate(format!("unclosed `{{{{` in `{}`", template))
        })?;
        push_literal(&mut segments, &mut literal);
        segments.push(Segment::Variable(check_name(&after[..end], template)?));
        rest = &after[end + 2..];
    }
    literal.push_str(rest);
    push_literal(&mut segments, &mut literal);
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: variables are inferred in order of first appearance.
    #[test]
    fn infers_input_variables() {
        let t = PromptTemplate::from_template("Tell me a {adjective} joke about {content}, {adjective}.")
            .unwrap();
        assert_eq!(t.input_variables(), vec!["adjective", "content"]);
        let out = t
            .format(&PromptValues::new().with("adjective", "funny").with("content", "chickens"))
            .unwrap();
        assert_eq!(out, "Tell me a funny joke about chickens, funny.");
    }

    #[test]
    fn no_variables() {
        let t = PromptTemplate::from_template("Tell me a joke.").unwrap();
        assert!(t.input_variables().is_empty());
        assert_eq!(t.format(&PromptValues::new()).unwrap(), "Tell me a joke.");
    }

    /// **Scenario**: a variable without a value is an error naming it.
    #[test]
    fn missing_variable() {
        let t = PromptTemplate::from_template("{a} and {b}").unwrap();
        assert_eq!(
            t.format(&PromptValues::new().with("a", "x")),
            Err(PromptError::MissingVariable("b".into()))
        );
    }

    #[test]
    fn fstring_escapes_and_errors() {
        let t = PromptTemplate::from_template("{{literal}} {x}").unwrap();
        assert_eq!(t.input_variables(), vec!["x"]);
        assert_eq!(
            t.format(&PromptValues::new().with("x", "1")).unwrap(),
            "{literal} 1"
        );
        assert!(matches!(
            PromptTemplate::from_template("oops {x"),
            Err(PromptError::InvalidTemplate(_))
        ));
        assert!(matches!(
            PromptTemplate::from_template("oops }"),
            Err(PromptError::InvalidTemplate(_))
        ));
        assert!(matches!(
            PromptTemplate::from_template("{}"),
            Err(PromptError::InvalidTemplate(_))
        ));
    }

    /// **Scenario**: mustache uses double braces; single braces stay literal.
    #[test]
    fn mustache_format() {
        let t = PromptTemplate::new(
            "What is a good name for a company that makes {{ product }}? {json}",
            TemplateFormat::Mustache,
        )
        .unwrap();
        assert_eq!(t.input_variables(), vec!["product"]);
        assert_eq!(
            t.format(&PromptValues::new().with("product", "colorful socks"))
                .unwrap(),
            "What is a good name for a company that makes colorful socks? {json}"
        );
    }

    /// **Scenario**: partials drop out of input_variables; supplied values win.
    #[test]
    fn partial_variables() {
        let t = PromptTemplate::from_template("{greeting}, {name}")
            .unwrap()
            .partial("greeting", "Hello");
        assert_eq!(t.input_variables(), vec!["name"]);
        assert_eq!(
            t.format(&PromptValues::new().with("name", "Ada")).unwrap(),
            "Hello, Ada"
        );
        assert_eq!(
            t.format(&PromptValues::new().with("name", "Ada").with("greeting", "Hi"))
                .unwrap(),
            "Hi, Ada"
        );
    }
}
