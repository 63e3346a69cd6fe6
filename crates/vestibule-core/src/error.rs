// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vestibule chat sync engine.

use thiserror::Error;

/// The primary error type used across all Vestibule crates.
#[derive(Debug, Error)]
pub enum VestibuleError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// REST API errors (request failure, non-success status, decode failure).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Realtime transport errors (handshake failure, frame codec, socket I/O).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An emit or send was attempted without a live connection.
    #[error("transport is not connected")]
    NotConnected,

    /// An operation that requires a focused conversation ran without one.
    #[error("no active conversation")]
    NoActiveConversation,

    /// The referenced conversation is not present in the local cache.
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
