// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes, positive page sizes, and backoff bounds.

use crate::diagnostic::ConfigError;
use crate::model::VestibuleConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VestibuleConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.client.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.client.log_level
            ),
        });
    }

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url must start with http:// or https://, got `{base_url}`"),
        });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be at least 1".to_string(),
        });
    }

    let socket_url = config.realtime.url.trim();
    if socket_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "realtime.url must not be empty".to_string(),
        });
    } else if !socket_url.starts_with("ws://") && !socket_url.starts_with("wss://") {
        errors.push(ConfigError::Validation {
            message: format!("realtime.url must start with ws:// or wss://, got `{socket_url}`"),
        });
    }

    if config.realtime.reconnect_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.reconnect_attempts must be at least 1".to_string(),
        });
    }

    if config.realtime.initial_backoff_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "realtime.initial_backoff_ms must be at least 1".to_string(),
        });
    }

    if config.realtime.max_backoff_ms < config.realtime.initial_backoff_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "realtime.max_backoff_ms ({}) must not be below realtime.initial_backoff_ms ({})",
                config.realtime.max_backoff_ms, config.realtime.initial_backoff_ms
            ),
        });
    }

    if config.sync.page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.page_size must be at least 1".to_string(),
        });
    }

    if config.sync.seen_cap == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.seen_cap must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = VestibuleConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = VestibuleConfig::default();
        config.client.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))
        ));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = VestibuleConfig::default();
        config.api.base_url = "ftp://backend".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))
        ));
    }

    #[test]
    fn non_ws_realtime_url_fails_validation() {
        let mut config = VestibuleConfig::default();
        config.realtime.url = "http://backend/ws".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("realtime.url"))
        ));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = VestibuleConfig::default();
        config.sync.page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("page_size"))
        ));
    }

    #[test]
    fn backoff_bounds_must_be_ordered() {
        let mut config = VestibuleConfig::default();
        config.realtime.initial_backoff_ms = 5000;
        config.realtime.max_backoff_ms = 1000;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("max_backoff_ms"))
        ));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = VestibuleConfig::default();
        config.api.base_url = String::new();
        config.sync.seen_cap = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 2, "expected both errors, got {errors:?}");
    }
}
