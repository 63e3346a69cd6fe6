// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock event transport for deterministic testing.
//!
//! `MockTransport` implements `EventTransport` with injectable inbound
//! events and captured outbound client events for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use vestibule_core::{ClientEvent, EventTransport, TransportEvent, VestibuleError};

/// A scripted event transport for testing.
///
/// Provides two queues:
/// - **inbound**: Events injected via `inject()` are returned by `next_event()`
/// - **emitted**: Events passed to `emit()` are captured and retrievable via `emitted()`
///
/// Clones share state, so a test can keep a handle while the engine owns
/// the boxed copy.
#[derive(Clone)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    inbound: Arc<Mutex<VecDeque<TransportEvent>>>,
    emitted: Arc<Mutex<Vec<ClientEvent>>>,
    notify: Arc<Notify>,
}

impl MockTransport {
    /// Create a new mock transport that reports itself connected.
    pub fn new() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            emitted: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Flip the reported connection state without producing events.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Inject a transport event into the inbound queue.
    ///
    /// The next call to `next_event()` will return this event.
    pub async fn inject(&self, event: TransportEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Get all client events that were passed to `emit()`.
    pub async fn emitted(&self) -> Vec<ClientEvent> {
        self.emitted.lock().await.clone()
    }

    /// Get the count of emitted client events.
    pub async fn emitted_count(&self) -> usize {
        self.emitted.lock().await.len()
    }

    /// Clear the emitted-event capture.
    pub async fn clear_emitted(&self) {
        self.emitted.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventTransport for MockTransport {
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
