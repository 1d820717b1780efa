//! Validation and merging of caller-supplied render option overrides.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::types::{RenderOptions, ValidationLevel};

const ALLOWED_OPTIONS: [&str; 4] = ["keepComments", "beautify", "minify", "validationLevel"];
const BOOLEAN_OPTIONS: [&str; 3] = ["keepComments", "beautify", "minify"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("Invalid option: \"{0}\"")]
    UnknownKey(String),
    #[error("Invalid value for validationLevel: \"{0}\"")]
    InvalidValidationLevel(String),
    #[error("Expected boolean for \"{key}\", got \"{actual}\"")]
    ExpectedBoolean { key: String, actual: &'static str },
}

/// Check a caller-supplied override map against the allow-list. Pure; the
/// caller merges only after this returns `Ok`.
pub fn validate_overrides(overrides: &Map<String, Value>) -> Result<(), OptionError> {
    for (key, value) in overrides {
        if !ALLOWED_OPTIONS.contains(&key.as_str()) {
            return Err(OptionError::UnknownKey(key.clone()));
        }

        if key == "validationLevel" {
            let valid = value
                .as_str()
                .is_some_and(|level| level.parse::<ValidationLevel>().is_ok());
            if !valid {
                return Err(OptionError::InvalidValidationLevel(display_value(value)));
            }
        }

        if BOOLEAN_OPTIONS.contains(&key.as_str()) && !value.is_boolean() {
            return Err(OptionError::ExpectedBoolean {
                key: key.clone(),
                actual: json_type_name(value),
            });
        }
    }

    Ok(())
}

/// Shallow merge of validated overrides onto the server defaults, key by key.
pub fn merge_overrides(base: &RenderOptions, overrides: &Map<String, Value>) -> RenderOptions {
    let mut merged = base.clone();
    if let Some(value) = overrides.get("keepComments").and_then(Value::as_bool) {
        merged.keep_comments = value;
    }
    if let Some(value) = overrides.get("beautify").and_then(Value::as_bool) {
        merged.beautify = value;
    }
    if let Some(value) = overrides.get("minify").and_then(Value::as_bool) {
        merged.minify = value;
    }
    if let Some(level) = overrides
        .get("validationLevel")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<ValidationLevel>().ok())
    {
        merged.validation_level = level;
    }
    merged
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn overrides(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    fn defaults() -> RenderOptions {
        RenderOptions {
            keep_comments: true,
            beautify: false,
            minify: false,
            validation_level: ValidationLevel::Soft,
        }
    }

    #[test]
    fn accepts_the_full_allow_list() {
        let map = overrides(json!({
            "keepComments": false,
            "beautify": true,
            "minify": true,
            "validationLevel": "strict",
        }));
        assert_eq!(validate_overrides(&map), Ok(()));

        let merged = merge_overrides(&defaults(), &map);
        assert!(!merged.keep_comments);
        assert!(merged.beautify);
        assert!(merged.minify);
        assert_eq!(merged.validation_level, ValidationLevel::Strict);
    }

    #[test]
    fn rejects_unknown_keys_by_name() {
        let map = overrides(json!({ "fonts": {} }));
        let error = validate_overrides(&map).unwrap_err();
        assert_eq!(error, OptionError::UnknownKey("fonts".to_string()));
        assert!(error.to_string().contains("fonts"));
    }

    #[test]
    fn rejects_unknown_validation_levels() {
        let map = overrides(json!({ "validationLevel": "loose" }));
        assert_eq!(
            validate_overrides(&map),
            Err(OptionError::InvalidValidationLevel("loose".to_string()))
        );

        let map = overrides(json!({ "validationLevel": 3 }));
        assert!(validate_overrides(&map).is_err());
    }

    #[test]
    fn rejects_non_boolean_flags() {
        let map = overrides(json!({ "beautify": "yes" }));
        assert_eq!(
            validate_overrides(&map),
            Err(OptionError::ExpectedBoolean {
                key: "beautify".to_string(),
                actual: "string",
            })
        );
    }

    #[test]
    fn merge_is_shallow_and_key_by_key() {
        let map = overrides(json!({ "minify": true }));
        let merged = merge_overrides(&defaults(), &map);
        assert!(merged.minify);
        assert!(merged.keep_comments, "untouched keys keep their defaults");
        assert_eq!(merged.validation_level, ValidationLevel::Soft);
    }
}
