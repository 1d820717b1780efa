pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;

use crate::application::render::Renderer;
use crate::application::template::TemplateEngine;
use crate::config::Settings;

use self::rate_limit::FixedWindowLimiter;

/// Shared, request-independent state: resolved settings plus the renderer,
/// template engine, and limiter handles.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub renderer: Arc<dyn Renderer>,
    pub templates: Arc<TemplateEngine>,
    pub rate_limiter: Option<Arc<FixedWindowLimiter>>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, renderer: Arc<dyn Renderer>) -> Self {
        let rate_limiter = settings
            .rate_limit
            .as_ref()
            .map(|limits| Arc::new(FixedWindowLimiter::new(limits.window, limits.max_requests)));
        Self {
            settings,
            renderer,
            templates: Arc::new(TemplateEngine::new()),
            rate_limiter,
        }
    }
}

/// Assemble the service router. Stage order is fixed: auth gate, rate
/// limiter, compression, body-size limit, then dispatch; rejection at an
/// earlier stage short-circuits the rest.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/v1/render",
            post(handlers::render).get(handlers::render_method_not_allowed),
        )
        .route("/v1/render/batch", post(handlers::render_batch))
        .route("/v1/validate", post(handlers::validate))
        .route("/v1/health", get(handlers::health))
        .fallback(handlers::fallback)
        .layer(DefaultBodyLimit::max(state.settings.server.max_body_bytes))
        .with_state(state.clone());

    if state.settings.server.use_compression {
        router = router.layer(CompressionLayer::new());
    }
    if state.rate_limiter.is_some() {
        router = router.layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ));
    }
    if state.settings.auth.is_some() {
        router = router.layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::basic_auth,
        ));
    }

    router
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
