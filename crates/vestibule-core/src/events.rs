// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event model for the realtime channel.
//!
//! `ServerEvent` and `ClientEvent` mirror the backend's socket contract and
//! serialize as `{"event": <name>, "data": <payload>}` frames. `TransportEvent`
//! wraps server traffic together with connection lifecycle transitions so the
//! sync engine consumes a single ordered stream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{ChatId, Message, UserId, UserSummary};

/// Events received from the realtime server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A new message was delivered to a room this client has joined.
    ///
    /// The same message may arrive twice: once via the conversation room and
    /// once via the recipient's personal room. Deduplication is the
    /// reconciler's job, not the transport's.
    MessageReceived {
        message: Message,
        sender: UserSummary,
    },

    /// A participant acknowledged a conversation as read.
    ReadReceipt { chat_id: ChatId, user_id: UserId },

    /// A user came online.
    UserOnline { user_id: UserId },

    /// A user went offline.
    UserOffline { user_id: UserId },

    /// Full presence snapshot, sent in reply to `get_online_users`.
    #[serde(rename = "get_online_users")]
    OnlineUsers { user_ids: Vec<UserId> },
}

/// Events emitted by this client to the realtime server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Subscribe to a conversation's room.
    JoinChatRoom { chat_id: ChatId },

    /// Unsubscribe from a conversation's room.
    LeaveChatRoom { chat_id: ChatId },

    /// Subscribe to the user's personal notification room.
    JoinUserRoom { user_id: UserId },

    /// Unsubscribe from the user's personal notification room.
    LeaveUserRoom { user_id: UserId },

    /// Send a message to a conversation.
    SendMessage {
        chat_id: ChatId,
        text: String,
        #[serde(default)]
        files: Vec<String>,
    },

    /// Request a full presence snapshot.
    GetOnlineUsers,
}

/// Why the transport reported itself down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum DownReason {
    /// The connection dropped; an automatic reconnect is in progress.
    ConnectionLost,
    /// The retry budget was exhausted; the transport stays down until the
    /// consumer calls connect again.
    RetriesExhausted,
    /// Orderly teardown requested by the consumer.
    Disconnected,
}

/// Connection lifecycle and server traffic, surfaced as one ordered stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A connection was established. `resumed` is false on the first connect
    /// of a transport's lifetime and true on every reconnect after that.
    Up { resumed: bool },

    /// The connection went down.
    Down { reason: DownReason },

    /// A decoded server event.
    Server(ServerEvent),
}
