// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the Vestibule chat backend.
//!
//! This crate provides [`ApiClient`], a thin typed wrapper over the backend's
//! HTTP API: current-user lookup, conversation listing, paginated message
//! history, read acknowledgments, and conversation management. Calls are not
//! retried here; callers own the retry affordance.

pub mod client;
pub mod types;

pub use client::ApiClient;
