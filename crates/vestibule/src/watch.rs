// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vestibule watch` command implementation.
//!
//! Bootstraps the sync engine over a live socket and runs its event loop
//! until SIGINT/SIGTERM, printing alerts to the terminal as they arrive.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vestibule_api::ApiClient;
use vestibule_config::model::VestibuleConfig;
use vestibule_core::VestibuleError;
use vestibule_notify::{Notifier, TerminalAlertSink};
use vestibule_sync::{EngineOptions, SyncEngine};
use vestibule_transport::{ReconnectPolicy, SocketTransport};

/// Run the `vestibule watch` command.
pub async fn run_watch(config: VestibuleConfig) -> Result<(), VestibuleError> {
    // Initialize tracing subscriber.
    init_tracing(&config.client.log_level);

    let mut engine = build_engine(&config).await?;
    info!(
        user = %engine.current_user().name,
        conversations = engine.store().snapshot().await.conversations.len(),
        "watching for messages"
    );

    let cancel = install_signal_handler();
    engine.run(cancel).await
}

/// Assembles the full stack from config: REST client, socket transport,
/// terminal notifier, bootstrapped engine.
pub(crate) async fn build_engine(config: &VestibuleConfig) -> Result<SyncEngine, VestibuleError> {
    let api = ApiClient::new(
        &config.api.base_url,
        config.api.auth_token.as_deref(),
        config.api.timeout_secs,
    )?;

    // The transport joins the personal room on every connect, so it needs
    // the authenticated user id up front.
    let me = api.me().await?;
    let transport = SocketTransport::new(
        &config.realtime.url,
        config.api.auth_token.as_deref(),
        me.id,
        ReconnectPolicy::new(
            config.realtime.reconnect_attempts,
            config.realtime.initial_backoff_ms,
            config.realtime.max_backoff_ms,
        ),
    );

    let notifier = Arc::new(Notifier::new(
        Arc::new(TerminalAlertSink::new()),
        config.notifications.enabled,
        config.notifications.sound,
    ));

    SyncEngine::bootstrap(
        api,
        Box::new(transport),
        notifier,
        EngineOptions {
            page_size: config.sync.page_size,
            seen_cap: config.sync.seen_cap,
        },
    )
    .await
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received. The signal handler task runs in the background until then.
pub(crate) fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vestibule={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
