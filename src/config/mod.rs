//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

pub use cli::{CliArgs, CliOverrides};

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::types::{RenderOptions, ValidationLevel};
use crate::util::bytes::parse_bytes;

const LOCAL_CONFIG_BASENAME: &str = "mjml-server";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 15500;
const DEFAULT_MAX_BODY: &str = "1mb";
const DEFAULT_RATE_LIMIT_WINDOW_MINUTES: u32 = 15;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Fully-resolved deployment settings after precedence resolution and
/// validation. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub render: RenderOptions,
    pub auth: Option<AuthSettings>,
    pub rate_limit: Option<RateLimitSettings>,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub use_compression: bool,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub window: Duration,
    pub max_requests: u32,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MJML"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process CLI arguments, returning both.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    host: Option<String>,
    port: Option<u16>,
    use_compression: Option<bool>,
    keep_comments: Option<bool>,
    beautify: Option<bool>,
    minify: Option<bool>,
    validation_level: Option<String>,
    max_body: Option<String>,
    auth_user: Option<String>,
    auth_pass: Option<String>,
    enable_rate_limit: Option<bool>,
    rate_limit_window: Option<u32>,
    rate_limit_max: Option<u32>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(host) = overrides.host.as_ref() {
            self.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.port = Some(port);
        }
        if let Some(value) = overrides.use_compression {
            self.use_compression = Some(value);
        }
        if let Some(value) = overrides.keep_comments {
            self.keep_comments = Some(value);
        }
        if let Some(value) = overrides.beautify {
            self.beautify = Some(value);
        }
        if let Some(value) = overrides.minify {
            self.minify = Some(value);
        }
        if let Some(level) = overrides.validation_level.as_ref() {
            self.validation_level = Some(level.clone());
        }
        if let Some(size) = overrides.max_body.as_ref() {
            self.max_body = Some(size.clone());
        }
        if let Some(user) = overrides.auth_user.as_ref() {
            self.auth_user = Some(user.clone());
        }
        if let Some(pass) = overrides.auth_pass.as_ref() {
            self.auth_pass = Some(pass.clone());
        }
        if let Some(value) = overrides.enable_rate_limit {
            self.enable_rate_limit = Some(value);
        }
        if let Some(window) = overrides.rate_limit_window {
            self.rate_limit_window = Some(window);
        }
        if let Some(max) = overrides.rate_limit_max {
            self.rate_limit_max = Some(max);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.log_level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.log_json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let server = build_server_settings(&raw)?;
        let render = build_render_defaults(&raw)?;
        let auth = build_auth_settings(&raw)?;
        let rate_limit = build_rate_limit_settings(&raw)?;
        let logging = build_logging_settings(&raw)?;

        Ok(Self {
            server,
            render,
            auth,
            rate_limit,
            logging,
        })
    }
}

fn build_server_settings(raw: &RawSettings) -> Result<ServerSettings, LoadError> {
    let host = raw.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = raw.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid("port", "port must be greater than zero"));
    }

    let addr = parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("host", reason))?;

    let max_body_raw = raw.max_body.as_deref().unwrap_or(DEFAULT_MAX_BODY);
    let max_body = parse_bytes(max_body_raw)
        .map_err(|err| LoadError::invalid("max_body", err.to_string()))?;
    if max_body == 0 {
        return Err(LoadError::invalid("max_body", "must be greater than zero"));
    }
    let max_body_bytes = usize::try_from(max_body)
        .map_err(|_| LoadError::invalid("max_body", "value exceeds supported range for usize"))?;

    Ok(ServerSettings {
        addr,
        use_compression: raw.use_compression.unwrap_or(true),
        max_body_bytes,
    })
}

fn build_render_defaults(raw: &RawSettings) -> Result<RenderOptions, LoadError> {
    let validation_level = match raw.validation_level.as_deref() {
        Some(level) => ValidationLevel::from_str(level)
            .map_err(|reason| LoadError::invalid("validation_level", reason))?,
        None => ValidationLevel::Soft,
    };

    Ok(RenderOptions {
        keep_comments: raw.keep_comments.unwrap_or(true),
        beautify: raw.beautify.unwrap_or(false),
        minify: raw.minify.unwrap_or(false),
        validation_level,
    })
}

fn build_auth_settings(raw: &RawSettings) -> Result<Option<AuthSettings>, LoadError> {
    let user = non_empty(raw.auth_user.as_deref());
    let pass = non_empty(raw.auth_pass.as_deref());

    match (user, pass) {
        (Some(user), Some(pass)) => Ok(Some(AuthSettings { user, pass })),
        (None, None) => Ok(None),
        _ => Err(LoadError::invalid(
            "auth_user",
            "auth-user and auth-pass must be provided together",
        )),
    }
}

fn build_rate_limit_settings(raw: &RawSettings) -> Result<Option<RateLimitSettings>, LoadError> {
    if !raw.enable_rate_limit.unwrap_or(false) {
        return Ok(None);
    }

    let window_minutes = raw
        .rate_limit_window
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MINUTES);
    if window_minutes == 0 {
        return Err(LoadError::invalid(
            "rate_limit_window",
            "must be greater than zero",
        ));
    }

    let max_requests = raw
        .rate_limit_max
        .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);
    if max_requests == 0 {
        return Err(LoadError::invalid(
            "rate_limit_max",
            "must be greater than zero",
        ));
    }

    Ok(Some(RateLimitSettings {
        window: Duration::from_secs(u64::from(window_minutes) * 60),
        max_requests,
    }))
}

fn build_logging_settings(raw: &RawSettings) -> Result<LoggingSettings, LoadError> {
    let level = match raw.log_level.as_deref() {
        Some(level) => LevelFilter::from_str(level)
            .map_err(|err| LoadError::invalid("log_level", format!("failed to parse: {err}")))?,
        None => LevelFilter::INFO,
    };

    let format = if raw.log_json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
