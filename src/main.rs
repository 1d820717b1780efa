use std::{net::SocketAddr, process, sync::Arc};

use mjml_server::{
    application::error::AppError,
    config,
    infra::{
        error::InfraError,
        http::{AppState, build_router},
        renderer::MrmlRenderer,
        telemetry,
    },
    util::bytes::format_bytes,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let settings = Arc::new(settings);
    info!(
        target = "mjml_server::startup",
        options = ?settings.render,
        max_body = %format_bytes(settings.server.max_body_bytes as u64),
        compression = settings.server.use_compression,
        auth = settings.auth.is_some(),
        rate_limit = settings.rate_limit.is_some(),
        "resolved configuration",
    );

    let state = AppState::new(settings.clone(), Arc::new(MrmlRenderer::new()));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "mjml_server::startup",
        addr = %settings.server.addr,
        "server is listening",
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "mjml_server::startup", "server closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "mjml_server::startup",
            error = %err,
            "failed to install shutdown signal handler",
        );
    }
}
