// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture builders for core chat types and their wire JSON.

use chrono::Utc;
use vestibule_core::{ChatId, Conversation, Message, MessageId, UserId, UserSummary};

/// A user summary with the given id and display name.
pub fn user(id: &str, name: &str) -> UserSummary {
    UserSummary {
        id: UserId(id.to_string()),
        name: name.to_string(),
        picture: None,
    }
}

/// A user summary with a random id.
pub fn random_user(name: &str) -> UserSummary {
    user(&uuid::Uuid::new_v4().to_string(), name)
}

/// A direct conversation between the given participants, no history.
pub fn conversation(id: &str, participants: Vec<UserSummary>) -> Conversation {
    Conversation {
        id: ChatId(id.to_string()),
        participants,
        group_name: None,
        group_picture: None,
        last_message: None,
        updated_at: Utc::now(),
        unread_counts: Default::default(),
    }
}

/// A text message, timestamped now, unread by everyone.
pub fn message(id: &str, chat_id: &str, sender_id: &str, text: &str) -> Message {
    Message {
        id: MessageId(id.to_string()),
        chat_id: ChatId(chat_id.to_string()),
        sender_id: UserId(sender_id.to_string()),
        text: text.to_string(),
        files: Vec::new(),
        created_at: Utc::now(),
        read_by: Vec::new(),
    }
}

/// Wire JSON for a user summary, as the backend serializes it.
pub fn user_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name })
}

/// Wire JSON for a conversation with the given participants.
pub fn conversation_json(id: &str, participants: &[(&str, &str)]) -> serde_json::Value {
    let participants: Vec<_> = participants
        .iter()
        .map(|(id, name)| user_json(id, name))
        .collect();
    serde_json::json!({
        "id": id,
        "participants": participants,
        "updated_at": Utc::now().to_rfc3339(),
    })
}

/// Wire JSON for a text message.
pub fn message_json(id: &str, chat_id: &str, sender_id: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "chat_id": chat_id,
        "sender_id": sender_id,
        "text": text,
        "created_at": Utc::now().to_rfc3339(),
    })
}
