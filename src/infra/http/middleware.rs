use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use subtle::ConstantTimeEq;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

use super::AppState;
use super::error::ApiFailure;
use super::rate_limit::Decision;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "mjml_server::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "mjml_server::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}

/// HTTP Basic gate. Runs before body capture; installed only when
/// credentials are configured.
pub async fn basic_auth(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.settings.auth.as_ref() else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(decode_basic)
        .map(|(user, pass)| {
            let user_ok = user.as_bytes().ct_eq(expected.user.as_bytes());
            let pass_ok = pass.as_bytes().ct_eq(expected.pass.as_bytes());
            bool::from(user_ok & pass_ok)
        })
        .unwrap_or(false);

    if !authorized {
        return ApiFailure::message(
            "infra::http::basic_auth",
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
        )
        .into_response();
    }

    next.run(request).await
}

fn decode_basic(header: &HeaderValue) -> Option<(String, String)> {
    let raw = header.to_str().ok()?;
    let encoded = raw.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(BASE64.decode(encoded.trim()).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Fixed-window limiter keyed by the remote address. Every response carries
/// the draft standard headers; the legacy `X-RateLimit-*` family is absent.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let decision = limiter.check(&key);
    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        ApiFailure::message(
            "infra::http::rate_limit",
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later.",
        )
        .into_response()
    };

    apply_rate_limit_headers(&mut response, &decision);
    response
}

fn apply_rate_limit_headers(response: &mut Response, decision: &Decision) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("ratelimit-limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_secs.to_string()) {
        headers.insert("ratelimit-reset", value);
    }
}

#[cfg(test)]
mod tests {
    use super::decode_basic;
    use axum::http::HeaderValue;

    #[test]
    fn decodes_well_formed_basic_credentials() {
        let header = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert_eq!(
            decode_basic(&header),
            Some(("user".to_string(), "pass".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        for raw in ["Bearer abc", "Basic !!!", "Basic dXNlcg=="] {
            let header = HeaderValue::from_static(raw);
            assert_eq!(decode_basic(&header), None, "{raw}");
        }
    }

    #[test]
    fn passwords_may_contain_colons() {
        // user "u", password "p:w"
        let header = HeaderValue::from_static("Basic dTpwOnc=");
        assert_eq!(decode_basic(&header), Some(("u".to_string(), "p:w".to_string())));
    }
}
