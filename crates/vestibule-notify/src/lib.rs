// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification side-effect dispatcher.
//!
//! The reconciler decides which inbound messages qualify for an alert
//! (deduplicated, not self-authored, not for the focused conversation); the
//! [`Notifier`] applies the remaining gates (globally enabled, not
//! suppressed by the current view) and fans out to an [`AlertSink`] at most
//! once per message. Presentation is fire-and-forget: sink failures are the
//! sink's problem, never the caller's.

pub mod terminal;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use vestibule_core::{AlertSink, Message, UserSummary};

pub use terminal::TerminalAlertSink;

/// Longest message preview carried in an alert, in characters.
const PREVIEW_MAX_CHARS: usize = 60;

/// Dispatches at most one user-facing alert per qualifying inbound message.
pub struct Notifier {
    sink: Arc<dyn AlertSink>,
    enabled: bool,
    sound: bool,
    suppressed: AtomicBool,
}

impl Notifier {
    pub fn new(sink: Arc<dyn AlertSink>, enabled: bool, sound: bool) -> Self {
        Self {
            sink,
            enabled,
            sound,
            suppressed: AtomicBool::new(false),
        }
    }

    /// Suppresses alerts while a view renders its own in-place badges (an
    /// "all conversations" screen, for instance).
    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::SeqCst);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst)
    }

    /// Raises the alert for one qualifying message: a toast and, when
    /// configured, a single audible cue. Returns true when the alert fired.
    pub async fn dispatch(&self, sender: &UserSummary, message: &Message) -> bool {
        if !self.enabled || self.is_suppressed() {
            debug!(
                enabled = self.enabled,
                suppressed = self.is_suppressed(),
                "alert gated off"
            );
            return false;
        }

        let summary = compose_summary(sender, message);
        self.sink.toast(&summary).await;
        if self.sound {
            self.sink.chime().await;
        }
        true
    }
}

/// Builds the alert text: sender name plus a short message preview, or an
/// attachment indicator when the message carries files but no text.
pub fn compose_summary(sender: &UserSummary, message: &Message) -> String {
    if message.is_attachment_only() {
        return format!("{} sent an attachment", sender.name);
    }
    let mut preview: String = message.text.chars().take(PREVIEW_MAX_CHARS).collect();
    if message.text.chars().count() > PREVIEW_MAX_CHARS {
        preview.push('…');
    }
    format!("{}: {}", sender.name, preview)
}
