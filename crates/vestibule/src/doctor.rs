// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vestibule doctor` command implementation.
//!
//! Runs diagnostic checks against the Vestibule environment to identify
//! configuration issues and connectivity problems.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use vestibule_api::ApiClient;
use vestibule_config::model::VestibuleConfig;
use vestibule_core::{EventTransport, VestibuleError};
use vestibule_transport::{ReconnectPolicy, SocketTransport};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `vestibule doctor` command.
///
/// Runs quick diagnostic checks. With `--deep`, runs additional checks that
/// hit the network with authentication. With `--plain`, disables colors.
pub async fn run_doctor(
    config: &VestibuleConfig,
    deep: bool,
    plain: bool,
) -> Result<(), VestibuleError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    // Quick checks (always run)
    results.push(check_config().await);
    results.push(check_auth_token(config));
    results.push(check_rest_reachability(config).await);

    // Deep checks (only with --deep)
    if deep {
        results.push(check_identity(config).await);
        results.push(check_socket(config).await);
    }

    // Print results
    println!();
    println!("  vestibule doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line;

        match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    let symbol = "✓".green().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                } else {
                    line = format!(
                        "    [OK]   {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "!".yellow().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name,
                        result.message.yellow()
                    );
                } else {
                    line = format!(
                        "    [WARN] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "✗".red().to_string();
                    line = format!(
                        "    {symbol} {:<20} {} ({duration_ms}ms)",
                        result.name,
                        result.message.red()
                    );
                } else {
                    line = format!(
                        "    [FAIL] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
        }

        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Check configuration loads without errors.
async fn check_config() -> CheckResult {
    let start = Instant::now();
    match vestibule_config::load_and_validate() {
        Ok(_) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: start.elapsed(),
        },
        Err(errors) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Fail,
            message: format!("{} error(s)", errors.len()),
            duration: start.elapsed(),
        },
    }
}

/// Check an auth token is configured, without using it.
fn check_auth_token(config: &VestibuleConfig) -> CheckResult {
    let start = Instant::now();
    if config.api.auth_token.is_some() {
        CheckResult {
            name: "Auth token".to_string(),
            status: CheckStatus::Pass,
            message: "configured".to_string(),
            duration: start.elapsed(),
        }
    } else {
        CheckResult {
            name: "Auth token".to_string(),
            status: CheckStatus::Warn,
            message: "not set (set api.auth_token or VESTIBULE_API_AUTH_TOKEN)".to_string(),
            duration: start.elapsed(),
        }
    }
}

/// Check the REST backend answers at all. Any HTTP status counts as
/// reachable; this check is about the network path, not authentication.
async fn check_rest_reachability(config: &VestibuleConfig) -> CheckResult {
    let start = Instant::now();
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            return CheckResult {
                name: "REST API".to_string(),
                status: CheckStatus::Fail,
                message: format!("client build failed: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    match client.get(&config.api.base_url).send().await {
        Ok(response) => CheckResult {
            name: "REST API".to_string(),
            status: CheckStatus::Pass,
            message: format!("reachable (HTTP {})", response.status().as_u16()),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "REST API".to_string(),
            status: CheckStatus::Fail,
            message: format!("unreachable: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Deep check: the configured token resolves to a user.
async fn check_identity(config: &VestibuleConfig) -> CheckResult {
    let start = Instant::now();
    let api = match ApiClient::new(
        &config.api.base_url,
        config.api.auth_token.as_deref(),
        config.api.timeout_secs,
    ) {
        Ok(api) => api,
        Err(e) => {
            return CheckResult {
                name: "Identity".to_string(),
                status: CheckStatus::Fail,
                message: format!("client build failed: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    match api.me().await {
        Ok(me) => CheckResult {
            name: "Identity".to_string(),
            status: CheckStatus::Pass,
            message: format!("authenticated as {}", me.name),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Identity".to_string(),
            status: CheckStatus::Fail,
            message: format!("authentication failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Deep check: the realtime socket completes a handshake.
async fn check_socket(config: &VestibuleConfig) -> CheckResult {
    let start = Instant::now();
    let me = match ApiClient::new(
        &config.api.base_url,
        config.api.auth_token.as_deref(),
        config.api.timeout_secs,
    ) {
        Ok(api) => match api.me().await {
            Ok(me) => me,
            Err(e) => {
                return CheckResult {
                    name: "Realtime socket".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("identity lookup failed: {e}"),
                    duration: start.elapsed(),
                };
            }
        },
        Err(e) => {
            return CheckResult {
                name: "Realtime socket".to_string(),
                status: CheckStatus::Fail,
                message: format!("client build failed: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    // Single attempt, no retries; the cycle reports Up or gives up.
    let mut transport = SocketTransport::new(
        &config.realtime.url,
        config.api.auth_token.as_deref(),
        me.id,
        ReconnectPolicy::new(1, 100, 100),
    );

    let result = probe_handshake(&mut transport).await;
    let _ = transport.disconnect().await;

    match result {
        Ok(true) => CheckResult {
            name: "Realtime socket".to_string(),
            status: CheckStatus::Pass,
            message: "handshake ok".to_string(),
            duration: start.elapsed(),
        },
        Ok(false) => CheckResult {
            name: "Realtime socket".to_string(),
            status: CheckStatus::Fail,
            message: "handshake timed out".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Realtime socket".to_string(),
            status: CheckStatus::Fail,
            message: format!("handshake failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

async fn probe_handshake(transport: &mut SocketTransport) -> Result<bool, VestibuleError> {
    transport.connect().await?;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let event = tokio::select! {
            event = transport.next_event() => event?,
            _ = tokio::time::sleep_until(deadline) => return Ok(false),
        };
        match event {
            vestibule_core::TransportEvent::Up { .. } => return Ok(true),
            vestibule_core::TransportEvent::Down {
                reason: vestibule_core::DownReason::RetriesExhausted,
            } => return Ok(false),
            _ => {}
        }
    }
}
