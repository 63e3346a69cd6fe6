// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert presentation trait for notification side effects.

use async_trait::async_trait;

/// A user-facing alert surface (toast plus audible cue).
///
/// Both methods are fire-and-forget: implementations must never block the
/// caller on presentation problems and must swallow their own failures. An
/// unsupported audio environment downgrades the alert to toast-only.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Shows a short textual alert.
    async fn toast(&self, summary: &str);

    /// Plays a single short audible cue.
    async fn chime(&self);
}
