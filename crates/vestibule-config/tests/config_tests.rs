// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vestibule configuration system.

use vestibule_config::diagnostic::{ConfigError, suggest_key};
use vestibule_config::model::VestibuleConfig;
use vestibule_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vestibule_config() {
    let toml = r#"
[client]
name = "front-desk"
log_level = "debug"

[api]
base_url = "https://backend.example.com"
auth_token = "tok-123"
timeout_secs = 10

[realtime]
url = "wss://backend.example.com/ws"
reconnect_attempts = 5
initial_backoff_ms = 500
max_backoff_ms = 8000

[sync]
page_size = 25
seen_cap = 128

[notifications]
enabled = false
sound = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.client.name, "front-desk");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.api.base_url, "https://backend.example.com");
    assert_eq!(config.api.auth_token.as_deref(), Some("tok-123"));
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.realtime.url, "wss://backend.example.com/ws");
    assert_eq!(config.realtime.reconnect_attempts, 5);
    assert_eq!(config.realtime.initial_backoff_ms, 500);
    assert_eq!(config.realtime.max_backoff_ms, 8000);
    assert_eq!(config.sync.page_size, 25);
    assert_eq!(config.sync.seen_cap, 128);
    assert!(!config.notifications.enabled);
    assert!(!config.notifications.sound);
}

/// Unknown field in [sync] section produces an UnknownField error.
#[test]
fn unknown_field_in_sync_produces_error() {
    let toml = r#"
[sync]
page_sise = 10
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("page_sise"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field in [api] section produces an UnknownField error.
#[test]
fn unknown_field_in_api_produces_error() {
    let toml = r#"
[api]
auth_tokn = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("auth_tokn"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.client.name, "vestibule");
    assert_eq!(config.client.log_level, "info");
    assert_eq!(config.api.base_url, "http://localhost:5000");
    assert!(config.api.auth_token.is_none());
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.realtime.url, "ws://localhost:5000/ws");
    assert_eq!(config.realtime.reconnect_attempts, 3);
    assert_eq!(config.realtime.initial_backoff_ms, 1000);
    assert_eq!(config.realtime.max_backoff_ms, 10_000);
    assert_eq!(config.sync.page_size, 20);
    assert_eq!(config.sync.seen_cap, 64);
    assert!(config.notifications.enabled);
    assert!(config.notifications.sound);
}

/// A dotted key override merges over TOML content.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[client]
name = "from-toml"
"#;

    let config: VestibuleConfig = Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("client.name", "from-override"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.client.name, "from-override");
}

/// The api.auth_token key maps as one key, not api.auth.token.
#[test]
fn auth_token_maps_as_single_key() {
    use figment::{Figment, providers::Serialized};

    let config: VestibuleConfig = Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(("api.auth_token", "tok-from-env"))
        .extract()
        .expect("should set auth_token via dot notation");

    assert_eq!(config.api.auth_token.as_deref(), Some("tok-from-env"));
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: VestibuleConfig = Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(Toml::file("/nonexistent/path/vestibule.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.client.name, "vestibule");
}

/// Loading from an explicit file path picks up its contents.
#[test]
fn load_from_path_reads_file() {
    use std::io::Write;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vestibule.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[sync]\npage_size = 7").unwrap();

    let config = load_config_from_path(&path).expect("file should load");
    assert_eq!(config.sync.page_size, 7);
    // Untouched sections keep defaults.
    assert_eq!(config.sync.seen_cap, 64);
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[metrics]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("metrics"),
        "error should mention unknown field, got: {err_str}"
    );
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "page_sise" in [sync] produces suggestion "did you mean `page_size`?"
#[test]
fn diagnostic_page_sise_suggests_page_size() {
    let valid_keys = &["page_size", "seen_cap"];
    let suggestion = suggest_key("page_sise", valid_keys);
    assert_eq!(suggestion, Some("page_size".to_string()));
}

/// Unknown key with no close match does NOT produce a suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["base_url", "auth_token", "timeout_secs"];
    let suggestion = suggest_key("qqqqqq", valid_keys);
    assert!(suggestion.is_none(), "should not suggest for distant typo");
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[sync]
page_sise = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "page_sise"
                && suggestion.as_deref() == Some("page_size")
                && valid_keys.contains("page_size")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'page_sise' with suggestion 'page_size', got: {errors:?}"
    );
}

/// Error output includes the list of valid keys for the section.
#[test]
fn diagnostic_error_includes_valid_keys() {
    let toml = r#"
[realtime]
ulr = "ws://x"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_valid_keys = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { valid_keys, .. } if {
            valid_keys.contains("url")
                && valid_keys.contains("reconnect_attempts")
                && valid_keys.contains("max_backoff_ms")
        })
    });
    assert!(
        has_valid_keys,
        "error should list valid keys for [realtime] section"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[sync]
page_size = "lots"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("page_size"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic (can be rendered).
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "page_sise".to_string(),
        suggestion: Some("page_size".to_string()),
        valid_keys: "page_size, seen_cap".to_string(),
        span: None,
        src: None,
    };

    let code = error.code();
    assert!(code.is_some(), "should have diagnostic code");

    let help = error.help();
    assert!(help.is_some(), "should have help text");
    let help_str = help.unwrap().to_string();
    assert!(
        help_str.contains("did you mean `page_size`"),
        "help should contain suggestion, got: {help_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "page_sise".to_string(),
        suggestion: Some("page_size".to_string()),
        valid_keys: "page_size, seen_cap".to_string(),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(buf.contains("page_sise"), "rendered report should mention the key");
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[client]
name = "reception"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.client.name, "reception");
}

/// Validation catches a zero reconnect budget.
#[test]
fn validation_catches_zero_reconnect_attempts() {
    let toml = r#"
[realtime]
reconnect_attempts = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero attempts should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("reconnect_attempts"))
    });
    assert!(
        has_validation_error,
        "should have validation error for reconnect_attempts"
    );
}
