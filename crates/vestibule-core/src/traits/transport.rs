// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for the realtime event channel.

use async_trait::async_trait;

use crate::error::VestibuleError;
use crate::events::{ClientEvent, TransportEvent};

/// A bidirectional realtime event channel.
///
/// Implementations own exactly one live connection per authenticated session
/// and are responsible for the reconnect policy and for joining the user's
/// personal notification room on every successful connect.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Establishes the connection. Idempotent; a no-op when already
    /// connected. Connection failures are retried internally and never
    /// surface to the user (realtime is an enhancement, not a requirement).
    async fn connect(&mut self) -> Result<(), VestibuleError>;

    /// Leaves the personal room (best-effort) and tears the connection down.
    async fn disconnect(&mut self) -> Result<(), VestibuleError>;

    /// True while a live connection is established.
    fn is_connected(&self) -> bool;

    /// Emits a client event over the connection.
    ///
    /// Fails with [`VestibuleError::NotConnected`] when there is no live
    /// connection; no queueing or offline buffering is attempted.
    async fn emit(&self, event: ClientEvent) -> Result<(), VestibuleError>;

    /// Awaits the next transport event (lifecycle transition or decoded
    /// server traffic), in arrival order.
    async fn next_event(&self) -> Result<TransportEvent, VestibuleError>;
}
