// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vestibule send` command implementation.
//!
//! One-shot send: bootstrap the engine, wait for the socket to come up,
//! focus the target conversation, emit the message, tear down.

use std::time::Duration;

use vestibule_config::model::VestibuleConfig;
use vestibule_core::{ChatId, VestibuleError};
use vestibule_sync::SendStatus;

use crate::watch::build_engine;

/// How long the command waits for the socket before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the `vestibule send` command.
pub async fn run_send(
    config: VestibuleConfig,
    chat_id: &str,
    text: &str,
    files: Vec<String>,
) -> Result<(), VestibuleError> {
    let mut engine = build_engine(&config).await?;

    let connected = engine.await_connection(CONNECT_TIMEOUT).await?;
    if !connected {
        engine.shutdown().await?;
        return Err(VestibuleError::NotConnected);
    }

    let chat_id = ChatId(chat_id.to_string());
    let result = deliver(&mut engine, &chat_id, text, files).await;
    engine.shutdown().await?;

    match result? {
        SendStatus::Sent => {
            println!("sent");
            Ok(())
        }
        SendStatus::Dropped => Err(VestibuleError::NotConnected),
    }
}

async fn deliver(
    engine: &mut vestibule_sync::SyncEngine,
    chat_id: &ChatId,
    text: &str,
    files: Vec<String>,
) -> Result<SendStatus, VestibuleError> {
    engine.select_conversation(chat_id).await?;
    engine.send_message(text, files).await
}
