//! Wire-format request decoding and response bodies.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::types::{Diagnostic, RenderOptions};

/// Ceiling on batch fan-out; requests above this are rejected before any
/// item is rendered.
pub const MAX_BATCH_SIZE: usize = 50;

/// A decoded render request: the document plus optional variables and
/// option overrides.
#[derive(Debug, Clone)]
pub struct RenderInput {
    pub mjml: String,
    pub variables: Map<String, Value>,
    pub overrides: Map<String, Value>,
}

/// The body did not contain usable MJML.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidMjmlInput;

/// Structural problems with a batch envelope.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchDecodeError {
    InvalidShape,
    Empty,
    TooLarge(usize),
}

impl BatchDecodeError {
    pub fn message(&self) -> String {
        match self {
            Self::InvalidShape => {
                "Invalid batch input. Expected an array of render requests or an object with a `requests` array.".to_string()
            }
            Self::Empty => "Batch request must contain at least one item.".to_string(),
            Self::TooLarge(count) => format!(
                "Batch size limit exceeded: received {count} requests, maximum is {MAX_BATCH_SIZE}."
            ),
        }
    }
}

/// Decode a single-render body. JSON objects carrying an `mjml` string win;
/// anything else falls back to the legacy mode where the whole body is the
/// document. An empty document or a non-string `mjml` field is rejected.
pub fn decode_render_body(body: &[u8]) -> Result<RenderInput, InvalidMjmlInput> {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        match map.get("mjml") {
            Some(Value::String(mjml)) if !mjml.trim().is_empty() => {
                return Ok(RenderInput {
                    mjml: mjml.clone(),
                    variables: take_map(&map, "variables")
                        .or_else(|| take_map(&map, "data"))
                        .unwrap_or_default(),
                    overrides: take_map(&map, "options").unwrap_or_default(),
                });
            }
            Some(_) => return Err(InvalidMjmlInput),
            None => {}
        }
    }

    let raw = std::str::from_utf8(body).map_err(|_| InvalidMjmlInput)?;
    if raw.trim().is_empty() {
        return Err(InvalidMjmlInput);
    }
    Ok(RenderInput {
        mjml: raw.to_string(),
        variables: Map::new(),
        overrides: Map::new(),
    })
}

/// Decode a batch envelope into its raw items, enforcing shape and size.
pub fn decode_batch_body(body: &[u8]) -> Result<Vec<Value>, BatchDecodeError> {
    let items = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(map)) => match map.get("requests") {
            Some(Value::Array(items)) => items.clone(),
            _ => return Err(BatchDecodeError::InvalidShape),
        },
        _ => return Err(BatchDecodeError::InvalidShape),
    };

    if items.is_empty() {
        return Err(BatchDecodeError::Empty);
    }
    if items.len() > MAX_BATCH_SIZE {
        return Err(BatchDecodeError::TooLarge(items.len()));
    }
    Ok(items)
}

/// Decode one batch item. Items are JSON values, so there is no legacy
/// raw-body fallback here.
pub fn decode_batch_item(item: &Value) -> Result<RenderInput, InvalidMjmlInput> {
    let Value::Object(map) = item else {
        return Err(InvalidMjmlInput);
    };
    match map.get("mjml") {
        Some(Value::String(mjml)) if !mjml.trim().is_empty() => Ok(RenderInput {
            mjml: mjml.clone(),
            variables: take_map(map, "variables")
                .or_else(|| take_map(map, "data"))
                .unwrap_or_default(),
            overrides: take_map(map, "options").unwrap_or_default(),
        }),
        _ => Err(InvalidMjmlInput),
    }
}

fn take_map(map: &Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    map.get(key).and_then(Value::as_object).cloned()
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub mjml: String,
    pub mjml_version: String,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItemResult>,
}

#[derive(Debug, Serialize)]
pub struct BatchItemResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Diagnostic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn success(html: String) -> Self {
        Self {
            success: true,
            html: Some(html),
            errors: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, errors: Option<Vec<Diagnostic>>) -> Self {
        Self {
            success: false,
            html: None,
            errors,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub mjml_version: String,
    pub options: RenderOptions,
}
