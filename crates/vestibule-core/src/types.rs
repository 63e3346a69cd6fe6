// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Vestibule workspace.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a conversation (server-assigned).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

/// Unique identifier for a message (server-assigned).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Denormalized participant info as carried on conversations and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// A single chat message.
///
/// Messages are immutable once created except for `read_by`, which grows
/// monotonically as participants acknowledge the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    /// Message body. Empty for attachment-only messages.
    #[serde(default)]
    pub text: String,
    /// Attachment URLs, if any.
    #[serde(default)]
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Participants who have seen this message.
    #[serde(default)]
    pub read_by: Vec<UserId>,
}

impl Message {
    /// True when the message carries attachments but no text.
    pub fn is_attachment_only(&self) -> bool {
        self.text.trim().is_empty() && !self.files.is_empty()
    }

    /// Records that `user` has seen this message. Idempotent.
    pub fn mark_read_by(&mut self, user: &UserId) {
        if !self.read_by.contains(user) {
            self.read_by.push(user.clone());
        }
    }
}

/// A conversation (direct or group) as held in the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ChatId,
    /// Ordered participant list, including the current user.
    pub participants: Vec<UserSummary>,
    /// Group display name. `None` for direct conversations.
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub group_picture: Option<String>,
    /// Denormalized copy of the most recent message.
    #[serde(default)]
    pub last_message: Option<Message>,
    pub updated_at: DateTime<Utc>,
    /// Per-participant unread counters, keyed by user id.
    #[serde(default)]
    pub unread_counts: HashMap<UserId, u32>,
}

impl Conversation {
    /// Unread count for the given user; absent entries count as zero.
    pub fn unread_for(&self, user: &UserId) -> u32 {
        self.unread_counts.get(user).copied().unwrap_or(0)
    }

    /// True when this is a group conversation.
    pub fn is_group(&self) -> bool {
        self.group_name.is_some()
    }

    /// Display title from the viewer's perspective: the group name, or the
    /// other participants' names joined with commas.
    pub fn title_for(&self, viewer: &UserId) -> String {
        if let Some(name) = &self.group_name {
            return name.clone();
        }
        let others: Vec<&str> = self
            .participants
            .iter()
            .filter(|p| &p.id != viewer)
            .map(|p| p.name.as_str())
            .collect();
        if others.is_empty() {
            // A conversation with only the viewer in it (notes-to-self).
            self.participants
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_default()
        } else {
            others.join(", ")
        }
    }

    /// Looks up the denormalized summary for a participant, if present.
    pub fn participant(&self, user: &UserId) -> Option<&UserSummary> {
        self.participants.iter().find(|p| &p.id == user)
    }
}
