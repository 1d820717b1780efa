//! Variable substitution applied to MJML documents before compilation.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Template processing failed: {message}")]
pub struct TemplateError {
    pub message: String,
}

/// Mustache-style `{{key}}` interpolation. Values are HTML-escaped and
/// missing keys render as the empty string.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        Self { env }
    }

    /// Substitute `variables` into `template`. An empty variable map is a
    /// no-op fast path: the template is returned untouched, so literal
    /// `{{...}}` sequences survive when no substitution was requested.
    pub fn render(
        &self,
        template: &str,
        variables: &Map<String, Value>,
    ) -> Result<String, TemplateError> {
        if variables.is_empty() {
            return Ok(template.to_string());
        }

        self.env
            .render_str(template, variables)
            .map_err(|err| TemplateError {
                message: err.to_string(),
            })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
