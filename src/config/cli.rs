use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the mjml-server binary. Every flag has an
/// `MJML_*` environment equivalent resolved by the configuration layer.
#[derive(Debug, Parser)]
#[command(name = "mjml-server", version, about = "MJML rendering HTTP service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MJML_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CliOverrides {
    /// Override the listener host.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override the listener port.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Toggle response compression.
    #[arg(
        long = "use-compression",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub use_compression: Option<bool>,

    /// Keep comments in the HTML output.
    #[arg(
        long = "keep-comments",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub keep_comments: Option<bool>,

    /// Beautify the HTML output.
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub beautify: Option<bool>,

    /// Minify the HTML output.
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub minify: Option<bool>,

    /// Compiler validation level (strict|soft|skip).
    #[arg(long = "validation-level", value_name = "LEVEL")]
    pub validation_level: Option<String>,

    /// Maximum HTTP body size, e.g. `1mb` or `524288`.
    #[arg(long = "max-body", value_name = "SIZE")]
    pub max_body: Option<String>,

    /// Username for HTTP Basic authentication.
    #[arg(long = "auth-user", value_name = "USER")]
    pub auth_user: Option<String>,

    /// Password for HTTP Basic authentication.
    #[arg(long = "auth-pass", value_name = "PASS")]
    pub auth_pass: Option<String>,

    /// Enable the fixed-window rate limiter.
    #[arg(
        long = "enable-rate-limit",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub enable_rate_limit: Option<bool>,

    /// Rate limit window in minutes.
    #[arg(long = "rate-limit-window", value_name = "MINUTES")]
    pub rate_limit_window: Option<u32>,

    /// Maximum requests per client per window.
    #[arg(long = "rate-limit-max", value_name = "COUNT")]
    pub rate_limit_max: Option<u32>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}
