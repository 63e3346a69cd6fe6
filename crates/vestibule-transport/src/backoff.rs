// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded reconnect policy with capped exponential backoff.

use std::time::Duration;

/// Reconnect budget for one connect cycle.
///
/// A cycle makes up to `max_attempts` connection attempts, sleeping
/// `delay(attempt)` between consecutive attempts. The budget resets every
/// time a connection is established, so a long-lived session that drops
/// gets a full fresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts per cycle before giving up.
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Ceiling for the doubled delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl ReconnectPolicy {
    /// Creates a policy with the given budget and backoff bounds.
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Returns the sleep before retrying after failed attempt `attempt` (1-based).
    ///
    /// The delay doubles each attempt and is capped at `max_backoff_ms`:
    /// 1000ms, 2000ms, 4000ms, ... with the defaults.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let ms = self.initial_backoff_ms.saturating_mul(1u64 << exp);
        Duration::from_millis(ms.min(self.max_backoff_ms))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(3, 1000, 10_000)
    }
}
