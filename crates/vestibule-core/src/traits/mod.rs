// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the engine's external seams.
//!
//! The sync engine depends on these traits rather than on concrete transport
//! or presentation code, so tests can feed events synthetically and capture
//! alerts without a live socket or a terminal.

pub mod alert;
pub mod transport;

pub use alert::AlertSink;
pub use transport::EventTransport;
