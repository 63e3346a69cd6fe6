// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Vestibule chat backend.
//!
//! Provides [`ApiClient`] which handles request construction, bearer-token
//! authentication, and error mapping. Requests are issued exactly once --
//! fetch and mutation retries are owned by callers, not this layer.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::debug;
use vestibule_core::{ChatId, Conversation, Message, UserId, UserSummary, VestibuleError};

use crate::types::{
    AddParticipantRequest, ApiErrorBody, CreateGroupRequest, InitiateDirectRequest,
    UpdateGroupRequest,
};

/// HTTP client for backend REST communication.
///
/// Holds a pooled [`reqwest::Client`] with default headers (bearer token,
/// content type) applied to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a new backend API client.
    ///
    /// # Arguments
    /// * `base_url` - Backend root, e.g. `http://localhost:5000`
    /// * `auth_token` - Bearer token attached to every request, if present
    /// * `timeout_secs` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, VestibuleError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    VestibuleError::Config(format!("invalid auth token header value: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| VestibuleError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Returns the configured backend root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the authenticated user's profile.
    pub async fn me(&self) -> Result<UserSummary, VestibuleError> {
        let url = format!("{}/users/me", self.base_url);
        let response = self.send(self.client.get(&url), "fetch current user").await?;
        decode(response, "fetch current user").await
    }

    /// Fetches the full conversation list for the authenticated user.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, VestibuleError> {
        let url = format!("{}/chats", self.base_url);
        let response = self
            .send(self.client.get(&url), "list conversations")
            .await?;
        decode(response, "list conversations").await
    }

    /// Fetches one page of message history for a conversation.
    ///
    /// The backend returns messages in chronological order; `skip` counts
    /// from the newest message backwards, so `skip = 0` is the latest page.
    pub async fn fetch_messages(
        &self,
        chat_id: &ChatId,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<Message>, VestibuleError> {
        let url = format!("{}/messages", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("chat_id", chat_id.0.as_str())])
            .query(&[("limit", limit), ("skip", skip)]);
        let response = self.send(request, "fetch messages").await?;
        decode(response, "fetch messages").await
    }

    /// Marks every message in a conversation as read by the current user.
    pub async fn mark_read(&self, chat_id: &ChatId) -> Result<(), VestibuleError> {
        let url = format!("{}/chats/{}/read", self.base_url, chat_id);
        self.send(self.client.put(&url), "mark conversation read")
            .await?;
        Ok(())
    }

    /// Opens (or returns the existing) one-to-one conversation with a user.
    pub async fn initiate_direct(&self, user_id: &UserId) -> Result<Conversation, VestibuleError> {
        let url = format!("{}/chats/direct", self.base_url);
        let body = InitiateDirectRequest {
            user_id: user_id.clone(),
        };
        let response = self
            .send(self.client.post(&url).json(&body), "initiate direct chat")
            .await?;
        decode(response, "initiate direct chat").await
    }

    /// Creates a group conversation with the given name and members.
    pub async fn create_group(
        &self,
        group_name: &str,
        participant_ids: &[UserId],
    ) -> Result<Conversation, VestibuleError> {
        let url = format!("{}/chats/group", self.base_url);
        let body = CreateGroupRequest {
            group_name: group_name.to_string(),
            participant_ids: participant_ids.to_vec(),
        };
        let response = self
            .send(self.client.post(&url).json(&body), "create group chat")
            .await?;
        decode(response, "create group chat").await
    }

    /// Updates a group's display name and/or picture.
    pub async fn update_group(
        &self,
        chat_id: &ChatId,
        group_name: Option<&str>,
        group_picture: Option<&str>,
    ) -> Result<Conversation, VestibuleError> {
        let url = format!("{}/chats/{}", self.base_url, chat_id);
        let body = UpdateGroupRequest {
            group_name: group_name.map(str::to_string),
            group_picture: group_picture.map(str::to_string),
        };
        let response = self
            .send(self.client.put(&url).json(&body), "update group chat")
            .await?;
        decode(response, "update group chat").await
    }

    /// Adds a user to a group conversation.
    pub async fn add_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<Conversation, VestibuleError> {
        let url = format!("{}/chats/{}/participants", self.base_url, chat_id);
        let body = AddParticipantRequest {
            user_id: user_id.clone(),
        };
        let response = self
            .send(self.client.post(&url).json(&body), "add participant")
            .await?;
        decode(response, "add participant").await
    }

    /// Removes a user from a group conversation.
    pub async fn remove_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<Conversation, VestibuleError> {
        let url = format!(
            "{}/chats/{}/participants/{}",
            self.base_url, chat_id, user_id
        );
        let response = self
            .send(self.client.delete(&url), "remove participant")
            .await?;
        decode(response, "remove participant").await
    }

    /// Deletes a conversation for the current user.
    pub async fn delete_conversation(&self, chat_id: &ChatId) -> Result<(), VestibuleError> {
        let url = format!("{}/chats/{}", self.base_url, chat_id);
        self.send(self.client.delete(&url), "delete conversation")
            .await?;
        Ok(())
    }

    /// Sends a request and maps transport failures and non-2xx statuses
    /// to [`VestibuleError::Api`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: &'static str,
    ) -> Result<reqwest::Response, VestibuleError> {
        let response = request.send().await.map_err(|e| VestibuleError::Api {
            message: format!("{context}: request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, context, "API response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err_body) => format!("{context}: server returned {status}: {}", err_body.message),
            Err(_) => format!("{context}: server returned {status}: {body}"),
        };
        Err(VestibuleError::Api {
            message,
            source: None,
        })
    }
}

/// Decodes a JSON response body, mapping parse failures to [`VestibuleError::Api`].
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &'static str,
) -> Result<T, VestibuleError> {
    response.json().await.map_err(|e| VestibuleError::Api {
        message: format!("{context}: failed to parse response body: {e}"),
        source: Some(Box::new(e)),
    })
}
