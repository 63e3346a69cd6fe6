// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vestibule.toml` > `~/.config/vestibule/vestibule.toml`
//! > `/etc/vestibule/vestibule.toml` with environment variable overrides via
//! the `VESTIBULE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VestibuleConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vestibule/vestibule.toml` (system-wide)
/// 3. `~/.config/vestibule/vestibule.toml` (user XDG config)
/// 4. `./vestibule.toml` (local directory)
/// 5. `VESTIBULE_*` environment variables
pub fn load_config() -> Result<VestibuleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(Toml::file("/etc/vestibule/vestibule.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vestibule/vestibule.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vestibule.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<VestibuleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VestibuleConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VestibuleConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay intact: `VESTIBULE_API_AUTH_TOKEN` must map to
/// `api.auth_token`, not `api.auth.token`.
fn env_provider() -> Env {
    Env::prefixed("VESTIBULE_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: VESTIBULE_API_AUTH_TOKEN -> "api_auth_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("realtime_", "realtime.", 1)
            .replacen("sync_", "sync.", 1)
            .replacen("notifications_", "notifications.", 1);
        mapped.into()
    })
}
