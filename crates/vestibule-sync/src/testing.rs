// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-crate test fixtures: domain object builders and a scripted transport.
//!
//! Compiled only for this crate's own tests. The reusable mocks shipped to
//! other crates live in `vestibule-test-utils`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use vestibule_core::{
    ChatId, ClientEvent, Conversation, EventTransport, Message, MessageId, TransportEvent, UserId,
    UserSummary, VestibuleError,
};

pub fn user(id: &str, name: &str) -> UserSummary {
    UserSummary {
        id: UserId(id.to_string()),
        name: name.to_string(),
        picture: None,
    }
}

pub fn conversation(id: &str, participant_ids: &[&str]) -> Conversation {
    Conversation {
        id: ChatId(id.to_string()),
        participants: participant_ids
            .iter()
            .map(|p| user(p, &format!("user {p}")))
            .collect(),
        group_name: None,
        group_picture: None,
        last_message: None,
        updated_at: Utc::now(),
        unread_counts: Default::default(),
    }
}

pub fn message(id: &str, chat_id: &str, sender_id: &str, text: &str) -> Message {
    Message {
        id: MessageId(id.to_string()),
        chat_id: ChatId(chat_id.to_string()),
        sender_id: UserId(sender_id.to_string()),
        text: text.to_string(),
        files: vec![],
        created_at: Utc::now(),
        read_by: vec![],
    }
}

/// JSON body for one message, shaped like the backend's wire format.
pub fn message_json(id: &str, chat_id: &str, sender_id: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "chat_id": chat_id,
        "sender_id": sender_id,
        "text": text,
        "created_at": "2026-03-01T12:00:00Z",
    })
}

/// A scripted [`EventTransport`]: inbound events are injected, emitted
/// client events are captured. Clones share state.
#[derive(Clone)]
pub struct StubTransport {
    connected: Arc<AtomicBool>,
    inbound: Arc<Mutex<VecDeque<TransportEvent>>>,
    emitted: Arc<Mutex<Vec<ClientEvent>>>,
    notify: Arc<Notify>,
}

impl StubTransport {
    pub fn connected() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            emitted: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn inject(&self, event: TransportEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    pub async fn emitted(&self) -> Vec<ClientEvent> {
        self.emitted.lock().await.clone()
    }

    pub async fn clear_emitted(&self) {
        self.emitted.lock().await.clear();
    }
}

#[async_trait]
impl EventTransport for StubTransport {
    async fn connect(&mut self) -> Result<(), VestibuleError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), VestibuleError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), VestibuleError> {
        if !self.is_connected() {
            return Err(VestibuleError::NotConnected);
        }
        self.emitted.lock().await.push(event);
        Ok(())
    }

    async fn next_event(&self) -> Result<TransportEvent, VestibuleError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }
}
