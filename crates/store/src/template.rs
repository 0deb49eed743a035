//! Prompt template types for the promptdeck store.
//!
//! This module defines the domain entities shared by the store and both
//! custom-prompt backends.

use handlebars::Handlebars;
use promptdeck_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An immutable prompt template: a template string with named Handlebars
/// placeholders plus the ordered list of placeholder names it declares.
///
/// The invariant that every placeholder referenced in `template` appears in
/// `input_variables` is enforced at render time (strict mode), not when the
/// template enters the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template string, e.g. `"Answer the question: {{question}}"`
    pub template: String,

    /// Declared placeholder names, in order
    pub input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new template.
    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> Self {
        Self {
            template: template.into(),
            input_variables,
        }
    }

    /// Create a template over the playground's single `question` variable.
    ///
    /// All user-authored templates take this shape.
    pub fn for_question(template: impl Into<String>) -> Self {
        Self::new(template, vec!["question".to_string()])
    }

    /// Render the template with the supplied variables.
    ///
    /// Rendering is strict: a placeholder referenced by the template but
    /// absent from `variables` is an error rather than an empty string.
    pub fn render(&self, variables: &HashMap<String, String>) -> AppResult<String> {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string("prompt", &self.template)
            .map_err(|e| AppError::Template(format!("Failed to register template: {}", e)))?;

        handlebars
            .render("prompt", variables)
            .map_err(|e| AppError::Template(format!("Failed to render template: {}", e)))
    }
}

/// Provenance of a stored prompt.
///
/// Used for display only; lookup precedence is simply "custom overrides
/// system on name collision".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Built-in, shipped with the application
    System,
    /// User-authored, persisted by a backend
    Custom,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::System => write!(f, "system"),
            Origin::Custom => write!(f, "custom"),
        }
    }
}

/// A stored prompt with its provenance tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptEntry {
    pub origin: Origin,
    pub template: PromptTemplate,
}

/// One row of the tabular export returned by `PromptStore::data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRow {
    pub name: String,
    pub origin: Origin,
    pub template: String,
    pub input_variables: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_question() {
        let template = PromptTemplate::for_question("Answer briefly: {{question}}");
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What is Rust?".to_string());

        let rendered = template.render(&vars).unwrap();
        assert_eq!(rendered, "Answer briefly: What is Rust?");
    }

    #[test]
    fn test_render_missing_variable_is_error() {
        let template = PromptTemplate::for_question("Q: {{question}}");
        let vars = HashMap::new();

        let result = template.render(&vars);
        assert!(matches!(result, Err(AppError::Template(_))));
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let template = PromptTemplate::for_question("{{question}}");
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "a < b && c > d".to_string());

        assert_eq!(template.render(&vars).unwrap(), "a < b && c > d");
    }

    #[test]
    fn test_for_question_variable_list() {
        let template = PromptTemplate::for_question("{{question}}");
        assert_eq!(template.input_variables, vec!["question".to_string()]);
    }

    #[test]
    fn test_template_serde_shape() {
        let json = r#"{"template": "Hi {{question}}", "input_variables": ["question"]}"#;
        let template: PromptTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.template, "Hi {{question}}");
        assert_eq!(template.input_variables, vec!["question".to_string()]);
    }

    #[test]
    fn test_origin_tags() {
        assert_eq!(serde_json::to_string(&Origin::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Origin::Custom).unwrap(), "\"custom\"");
        assert_eq!(Origin::Custom.to_string(), "custom");
    }
}
