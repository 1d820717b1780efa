use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::application::options::{merge_overrides, validate_overrides};
use crate::application::render::RenderFailure;
use crate::domain::types::{RenderOptions, ValidationLevel};

use super::AppState;
use super::error::{ApiFailure, COMPILE_ERROR_MESSAGE, classify_failure};
use super::models::{
    BatchItemResult, BatchResponse, HealthResponse, RenderResponse, ValidateResponse,
    decode_batch_body, decode_batch_item, decode_render_body,
};

const INVALID_INPUT_MESSAGE: &str = "Invalid MJML input";
const TEMPLATE_ERROR_MESSAGE: &str = "Template processing failed";

/// POST /v1/render — compile one document.
pub async fn render(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    const SOURCE: &str = "infra::http::render";

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(SOURCE, rejection),
    };
    let input = match decode_render_body(&body) {
        Ok(input) => input,
        Err(_) => {
            return ApiFailure::message(SOURCE, StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE)
                .into_response();
        }
    };

    if let Err(error) = validate_overrides(&input.overrides) {
        return ApiFailure::message(SOURCE, StatusCode::BAD_REQUEST, error.to_string())
            .into_response();
    }
    let options = merge_overrides(&state.settings.render, &input.overrides);

    let document = match state.templates.render(&input.mjml, &input.variables) {
        Ok(document) => document,
        Err(error) => {
            return ApiFailure::with_detail(
                SOURCE,
                StatusCode::BAD_REQUEST,
                TEMPLATE_ERROR_MESSAGE,
                error.message,
            )
            .into_response();
        }
    };

    match state.renderer.render(&document, &options).await {
        Ok(output) if output.errors.is_empty() => Json(RenderResponse {
            html: output.html,
            mjml: input.mjml,
            mjml_version: state.renderer.version().to_string(),
            errors: Vec::new(),
        })
        .into_response(),
        Ok(output) => ApiFailure::compile(SOURCE, output.errors).into_response(),
        Err(failure) => classify_failure(SOURCE, &failure).into_response(),
    }
}

/// GET /v1/render is not part of the API; point callers at POST.
pub async fn render_method_not_allowed() -> Response {
    ApiFailure::message(
        "infra::http::render",
        StatusCode::METHOD_NOT_ALLOWED,
        "GET method not allowed. Use POST /v1/render",
    )
    .into_response()
}

/// POST /v1/render/batch — compile up to 50 documents concurrently. Items
/// fail independently; the response always pairs one result per request, in
/// order.
pub async fn render_batch(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    const SOURCE: &str = "infra::http::render_batch";

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(SOURCE, rejection),
    };
    let items = match decode_batch_body(&body) {
        Ok(items) => items,
        Err(error) => {
            return ApiFailure::message(SOURCE, StatusCode::BAD_REQUEST, error.message())
                .into_response();
        }
    };

    let results = futures::future::join_all(items.iter().map(|item| {
        let state = state.clone();
        async move { render_batch_item(&state, item).await }
    }))
    .await;

    Json(BatchResponse { results }).into_response()
}

async fn render_batch_item(state: &AppState, item: &Value) -> BatchItemResult {
    let Ok(input) = decode_batch_item(item) else {
        return BatchItemResult::failure(INVALID_INPUT_MESSAGE, None);
    };

    if let Err(error) = validate_overrides(&input.overrides) {
        return BatchItemResult::failure(error.to_string(), None);
    }
    let options = merge_overrides(&state.settings.render, &input.overrides);

    let document = match state.templates.render(&input.mjml, &input.variables) {
        Ok(document) => document,
        Err(error) => return BatchItemResult::failure(error.to_string(), None),
    };

    match state.renderer.render(&document, &options).await {
        Ok(output) if output.errors.is_empty() => BatchItemResult::success(output.html),
        Ok(output) => BatchItemResult::failure(COMPILE_ERROR_MESSAGE, Some(output.errors)),
        Err(failure) => {
            let diagnostics = failure.diagnostic().map(|diagnostic| vec![diagnostic]);
            BatchItemResult::failure(failure.to_string(), diagnostics)
        }
    }
}

/// POST /v1/validate — strict-mode compile that reports diagnostics without
/// caring about the produced HTML. Caller-supplied options are ignored.
pub async fn validate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    const SOURCE: &str = "infra::http::validate";

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(SOURCE, rejection),
    };
    let input = match decode_render_body(&body) {
        Ok(input) => input,
        Err(_) => {
            return ApiFailure::message(SOURCE, StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE)
                .into_response();
        }
    };

    let options = RenderOptions {
        validation_level: ValidationLevel::Strict,
        ..state.settings.render.clone()
    };

    let document = match state.templates.render(&input.mjml, &input.variables) {
        Ok(document) => document,
        Err(error) => {
            return ApiFailure::with_detail(
                SOURCE,
                StatusCode::BAD_REQUEST,
                TEMPLATE_ERROR_MESSAGE,
                error.message,
            )
            .into_response();
        }
    };

    match state.renderer.render(&document, &options).await {
        Ok(output) => Json(ValidateResponse {
            valid: output.errors.is_empty(),
            errors: output.errors,
        })
        .into_response(),
        Err(failure @ RenderFailure::Parse { .. }) => {
            classify_failure(SOURCE, &failure).into_response()
        }
        Err(failure) => ApiFailure::with_detail(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Validation error",
            failure.to_string(),
        )
        .into_response(),
    }
}

/// GET /v1/health — liveness plus the resolved render defaults.
pub async fn health(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        message: "MJML server is running",
        mjml_version: state.renderer.version().to_string(),
        options: state.settings.render.clone(),
    })
    .into_response()
}

/// Any unmatched route.
pub async fn fallback() -> Response {
    ApiFailure::message(
        "infra::http::fallback",
        StatusCode::NOT_FOUND,
        "Endpoint not found. Try POST /v1/render",
    )
    .into_response()
}

fn body_rejection(source: &'static str, rejection: BytesRejection) -> Response {
    ApiFailure::message(source, rejection.status(), rejection.body_text()).into_response()
}
