//! JSON failure envelopes and renderer failure classification.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::application::error::ErrorReport;
use crate::application::render::RenderFailure;
use crate::domain::types::Diagnostic;

pub const COMPILE_ERROR_MESSAGE: &str = "Failed to compile mjml";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// A failure response: JSON body with a `message` field, plus a structured
/// report attached for the logging middleware.
#[derive(Debug)]
pub struct ApiFailure {
    source: &'static str,
    status: StatusCode,
    body: serde_json::Value,
    log_detail: String,
}

impl ApiFailure {
    pub fn message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            source,
            status,
            log_detail: message.clone(),
            body: json!({ "message": message }),
        }
    }

    /// `{message, error}` envelope; `detail` is the underlying error text.
    pub fn with_detail(
        source: &'static str,
        status: StatusCode,
        message: &str,
        detail: impl Into<String>,
    ) -> Self {
        let detail = detail.into();
        Self {
            source,
            status,
            log_detail: format!("{message}: {detail}"),
            body: json!({ "message": message, "error": detail }),
        }
    }

    /// The 400 compile-failure envelope shared by thrown diagnostics and
    /// renderer-returned error arrays.
    pub fn compile(source: &'static str, errors: Vec<Diagnostic>) -> Self {
        Self {
            source,
            status: StatusCode::BAD_REQUEST,
            log_detail: format!("compilation failed with {} diagnostic(s)", errors.len()),
            body: json!({
                "message": COMPILE_ERROR_MESSAGE,
                "level": "error",
                "errors": errors,
            }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        ErrorReport::from_message(self.source, self.status, self.log_detail).attach(&mut response);
        response
    }
}

/// Map a thrown renderer failure onto the HTTP contract: location-bearing
/// failures become the 400 compile envelope, everything else a sanitized 500
/// whose full detail only reaches the server log.
pub fn classify_failure(source: &'static str, failure: &RenderFailure) -> ApiFailure {
    match failure.diagnostic() {
        Some(diagnostic) => ApiFailure::compile(source, vec![diagnostic]),
        None => ApiFailure::with_detail(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE,
            failure.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn validation_failures_become_the_compile_envelope() {
        let failure = RenderFailure::Validation {
            line: 1,
            tag_name: "mj-text".to_string(),
            message: "Attribute foo is illegal".to_string(),
            formatted_message: "Line 1 of doc (mj-text) — Attribute foo is illegal".to_string(),
        };
        let classified = classify_failure("test", &failure);
        assert_eq!(classified.status(), StatusCode::BAD_REQUEST);

        let body = body_json(classified.into_response()).await;
        assert_eq!(body["message"], COMPILE_ERROR_MESSAGE);
        assert_eq!(body["level"], "error");
        assert_eq!(body["errors"][0]["tagName"], "mj-text");
        assert_eq!(body["errors"][0]["line"], 1);
    }

    #[tokio::test]
    async fn parse_failures_carry_line_and_column() {
        let failure = RenderFailure::Parse {
            line: 4,
            column: 9,
            message: "unexpected token".to_string(),
        };
        let body = body_json(classify_failure("test", &failure).into_response()).await;
        assert_eq!(body["errors"][0]["line"], 4);
        assert_eq!(body["errors"][0]["column"], 9);
    }

    #[tokio::test]
    async fn internal_failures_are_sanitized_500s() {
        let failure = RenderFailure::Internal("worker hit an odd state".to_string());
        let classified = classify_failure("test", &failure);
        assert_eq!(classified.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(classified.into_response()).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["error"], "worker hit an odd state");
        assert!(body.get("errors").is_none());
    }
}
