// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vestibule chat sync engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vestibule configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VestibuleConfig {
    /// Client identity and logging settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Realtime socket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Cache and reconciliation tuning.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Notification side-effect settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Client identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Display name used by the terminal surfaces.
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_client_name() -> String {
    "vestibule".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the backend REST API.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Bearer token for the authenticated session. `None` requires the
    /// `VESTIBULE_API_AUTH_TOKEN` environment variable.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            auth_token: None,
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

/// Realtime socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Websocket URL of the realtime server.
    #[serde(default = "default_realtime_url")]
    pub url: String,

    /// Consecutive failed connection attempts before the transport gives up
    /// and stays down until the next explicit connect.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Delay before the first reconnect attempt, in milliseconds. Doubles on
    /// each subsequent attempt.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on the reconnect delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_realtime_url(),
            reconnect_attempts: default_reconnect_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_realtime_url() -> String {
    "ws://localhost:5000/ws".to_string()
}

fn default_reconnect_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

/// Cache and reconciliation tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Fixed message page size for history fetches and load-more.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Capacity of the recently-seen message id buffer used for duplicate
    /// suppression. Oldest ids are evicted first.
    #[serde(default = "default_seen_cap")]
    pub seen_cap: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            seen_cap: default_seen_cap(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_seen_cap() -> usize {
    64
}

/// Notification side-effect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Enable user-facing alerts for inbound messages.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// Play an audible cue alongside each alert.
    #[serde(default = "default_notifications_sound")]
    pub sound: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            sound: default_notifications_sound(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_notifications_sound() -> bool {
    true
}
