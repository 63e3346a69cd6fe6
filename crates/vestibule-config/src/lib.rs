// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Vestibule chat sync engine.
//!
//! Settings merge from compiled defaults, the system and XDG `vestibule.toml`
//! files, a workspace-local `vestibule.toml`, and `VESTIBULE_`-prefixed
//! environment variables. Unknown keys are rejected rather than ignored, and
//! failures render as miette diagnostics pointing at the offending TOML span,
//! with a "did you mean" hint for near-miss key names.
//!
//! ```no_run
//! let config = vestibule_config::load_and_validate().expect("config errors");
//! println!("syncing against {}", config.api.base_url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::VestibuleConfig;

/// Loads from the full file/env hierarchy, then validates.
///
/// Figment deserialization failures are mapped to spanned diagnostics before
/// returning; semantic validation errors (bad URLs, zero page size) come back
/// in the same `Vec<ConfigError>` shape so callers render both identically.
pub fn load_and_validate() -> Result<VestibuleConfig, Vec<ConfigError>> {
    let config = loader::load_config()
        .map_err(|err| diagnostic::figment_to_config_errors(err, &hierarchy_sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Loads from a single TOML string (no files, no env) and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<VestibuleConfig, Vec<ConfigError>> {
    let config = loader::load_config_from_str(toml_content).map_err(|err| {
        let sources = vec![("<inline>".to_string(), toml_content.to_string())];
        diagnostic::figment_to_config_errors(err, &sources)
    })?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Reads whichever hierarchy files exist so diagnostics can resolve error
/// spans against the real file contents.
fn hierarchy_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/vestibule/vestibule.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("vestibule/vestibule.toml"));
    }
    let local = std::env::current_dir()
        .map(|d| d.join("vestibule.toml"))
        .unwrap_or_else(|_| std::path::PathBuf::from("vestibule.toml"));
    candidates.push(local);

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
