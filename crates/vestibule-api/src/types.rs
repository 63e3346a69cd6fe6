// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and error body types for the backend REST API.
//!
//! Response bodies decode directly into the shared domain types
//! ([`vestibule_core::Conversation`], [`vestibule_core::Message`],
//! [`vestibule_core::UserSummary`]), so only request payloads and the
//! backend's error envelope live here.

use serde::{Deserialize, Serialize};
use vestibule_core::UserId;

/// Error envelope returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error description.
    pub message: String,
}

/// Body for `POST /chats/direct` -- open (or reuse) a one-to-one conversation.
#[derive(Debug, Clone, Serialize)]
pub struct InitiateDirectRequest {
    /// The other participant.
    pub user_id: UserId,
}

/// Body for `POST /chats/group`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGroupRequest {
    /// Display name for the group.
    pub group_name: String,
    /// Initial members, excluding the creator (the backend adds the caller).
    pub participant_ids: Vec<UserId>,
}

/// Body for `PUT /chats/{id}` -- partial update of group metadata.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateGroupRequest {
    /// New display name, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// New picture URL, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_picture: Option<String>,
}

/// Body for `POST /chats/{id}/participants`.
#[derive(Debug, Clone, Serialize)]
pub struct AddParticipantRequest {
    /// The user to add.
    pub user_id: UserId,
}
