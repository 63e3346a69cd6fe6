// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vestibule chat sync engine.
//!
//! This crate provides the shared domain types, the realtime event model,
//! the workspace-wide error type, and the trait seams (transport, alert
//! presentation) implemented by the outer crates.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VestibuleError;
pub use events::{ClientEvent, DownReason, ServerEvent, TransportEvent};
pub use traits::{AlertSink, EventTransport};
pub use types::{ChatId, Conversation, Message, MessageId, UserId, UserSummary};
