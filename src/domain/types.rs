//! Core value types shared across the rendering pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Compiler strictness mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Fail fast on any schema violation.
    Strict,
    /// Report violations but still emit HTML.
    Soft,
    /// No validation at all.
    Skip,
}

impl ValidationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Soft => "soft",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "strict" => Ok(Self::Strict),
            "soft" => Ok(Self::Soft),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "expected one of `strict`, `soft`, `skip`, got `{other}`"
            )),
        }
    }
}

/// Render configuration: the server-wide defaults and the shape a caller may
/// override per request. Serialized in camelCase to match the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub keep_comments: bool,
    pub beautify: bool,
    pub minify: bool,
    pub validation_level: ValidationLevel,
}

/// A structured compile-time message, ordered as emitted by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Diagnostic {
    /// Schema violation tied to a tag.
    Validation {
        line: u32,
        #[serde(rename = "tagName")]
        tag_name: String,
        message: String,
        #[serde(rename = "formattedMessage")]
        formatted_message: String,
    },
    /// Syntax failure with a document position.
    Parse { line: u32, column: u32, message: String },
    /// Anything the renderer reports without location info.
    Generic { message: String },
}
