// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vestibule integration tests.
//!
//! Provides mock adapters and harness infrastructure for fast,
//! deterministic, CI-runnable tests without a live backend.
//!
//! # Components
//!
//! - [`MockTransport`] - Scripted event transport with injection and capture
//! - [`MockAlertSink`] - Alert sink that records toasts and chimes
//! - [`TestHarness`] - A bootstrapped engine against a wiremock backend

pub mod fixtures;
pub mod harness;
pub mod mock_sink;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_sink::MockAlertSink;
pub use mock_transport::MockTransport;
