// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert sink that records everything it is asked to present.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vestibule_core::AlertSink;

/// An [`AlertSink`] capturing toasts and counting chimes for assertions.
pub struct MockAlertSink {
    toasts: Mutex<Vec<String>>,
    chimes: AtomicUsize,
}

impl MockAlertSink {
    pub fn new() -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            chimes: AtomicUsize::new(0),
        }
    }

    /// All toast summaries presented so far, oldest first.
    pub async fn toasts(&self) -> Vec<String> {
        self.toasts.lock().await.clone()
    }

    pub async fn toast_count(&self) -> usize {
        self.toasts.lock().await.len()
    }

    pub fn chime_count(&self) -> usize {
        self.chimes.load(Ordering::SeqCst)
    }

    pub async fn clear(&self) {
        self.toasts.lock().await.clear();
        self.chimes.store(0, Ordering::SeqCst);
    }
}

impl Default for MockAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for MockAlertSink {
    async fn toast(&self, summary: &str) {
        self.toasts.lock().await.push(summary.to_string());
    }

    async fn chime(&self) {
        self.chimes.fetch_add(1, Ordering::SeqCst);
    }
}
