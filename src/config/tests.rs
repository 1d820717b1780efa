use super::*;

#[test]
fn defaults_resolve_to_the_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.server.addr.ip().to_string(), DEFAULT_HOST);
    assert!(settings.server.use_compression);
    assert_eq!(settings.server.max_body_bytes, 1024 * 1024);

    assert!(settings.render.keep_comments);
    assert!(!settings.render.beautify);
    assert!(!settings.render.minify);
    assert_eq!(settings.render.validation_level, ValidationLevel::Soft);

    assert!(settings.auth.is_none());
    assert!(settings.rate_limit.is_none());
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.port = Some(4000);
    raw.log_level = Some("info".to_string());

    let overrides = CliOverrides {
        port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn max_body_accepts_size_strings() {
    let mut raw = RawSettings::default();
    raw.max_body = Some("512kb".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.server.max_body_bytes, 512 * 1024);
}

#[test]
fn malformed_max_body_is_rejected() {
    let mut raw = RawSettings::default();
    raw.max_body = Some("a lot".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "max_body", .. })
    ));
}

#[test]
fn auth_credentials_must_be_paired() {
    let mut raw = RawSettings::default();
    raw.auth_user = Some("admin".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid { key: "auth_user", .. })
    ));

    let mut raw = RawSettings::default();
    raw.auth_user = Some("admin".to_string());
    raw.auth_pass = Some("hunter2".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    let auth = settings.auth.expect("auth configured");
    assert_eq!(auth.user, "admin");
    assert_eq!(auth.pass, "hunter2");
}

#[test]
fn blank_auth_values_count_as_unset() {
    let mut raw = RawSettings::default();
    raw.auth_user = Some("  ".to_string());
    raw.auth_pass = Some(String::new());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.auth.is_none());
}

#[test]
fn unknown_validation_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.validation_level = Some("loose".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "validation_level",
            ..
        })
    ));
}

#[test]
fn rate_limiting_is_opt_in_with_defaults() {
    let mut raw = RawSettings::default();
    raw.enable_rate_limit = Some(true);
    let settings = Settings::from_raw(raw).expect("valid settings");
    let limits = settings.rate_limit.expect("rate limit configured");
    assert_eq!(
        limits.window,
        Duration::from_secs(u64::from(DEFAULT_RATE_LIMIT_WINDOW_MINUTES) * 60)
    );
    assert_eq!(limits.max_requests, DEFAULT_RATE_LIMIT_MAX_REQUESTS);
}

#[test]
fn zero_rate_limit_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.enable_rate_limit = Some(true);
    raw.rate_limit_max = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "rate_limit_max",
            ..
        })
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = CliOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn flags_parse_into_overrides() {
    let args = CliArgs::parse_from([
        "mjml-server",
        "--port",
        "3000",
        "--minify",
        "true",
        "--validation-level",
        "strict",
        "--enable-rate-limit",
        "true",
    ]);

    assert_eq!(args.overrides.port, Some(3000));
    assert_eq!(args.overrides.minify, Some(true));
    assert_eq!(args.overrides.validation_level.as_deref(), Some("strict"));
    assert_eq!(args.overrides.enable_rate_limit, Some(true));
}
