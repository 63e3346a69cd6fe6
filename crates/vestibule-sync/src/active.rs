// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The active-conversation controller: focus, pagination, and mark-read.
//!
//! Exactly one conversation can be focused at a time. Focusing joins the
//! conversation's room, loads the first history page, and optimistically
//! zeroes the unread counter; the mark-read acknowledgment is best-effort
//! and a failure does not roll the counter back.
//!
//! Room membership is an explicit two-state machine keyed by conversation
//! id, not a byproduct of surface lifecycles: every join has exactly one
//! matching leave on reselection, deselection, or teardown.

use strum::Display;
use tracing::{debug, info, warn};
use vestibule_api::ApiClient;
use vestibule_core::{ChatId, ClientEvent, EventTransport, UserId, VestibuleError};

use crate::store::SharedStore;

/// Room membership states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RoomState {
    #[strum(serialize = "not-joined")]
    NotJoined,
    #[strum(serialize = "joined")]
    Joined,
}

/// Tracks which conversation room this client is subscribed to.
///
/// Join and leave emits are best-effort: realtime is an enhancement, so a
/// dead transport downgrades the transition to a logged local state change
/// (the server forgot the membership anyway when the connection dropped).
#[derive(Debug, Default)]
pub struct RoomMembership {
    joined: Option<ChatId>,
}

impl RoomMembership {
    pub fn state(&self) -> RoomState {
        if self.joined.is_some() {
            RoomState::Joined
        } else {
            RoomState::NotJoined
        }
    }

    pub fn joined_room(&self) -> Option<&ChatId> {
        self.joined.as_ref()
    }

    /// Leaves the current room, if any. Symmetric counterpart of every join.
    pub async fn leave(&mut self, transport: &dyn EventTransport) {
        if let Some(chat_id) = self.joined.take() {
            debug!(chat_id = %chat_id, from = %RoomState::Joined, to = %RoomState::NotJoined, "leaving room");
            if let Err(e) = transport
                .emit(ClientEvent::LeaveChatRoom {
                    chat_id: chat_id.clone(),
                })
                .await
            {
                warn!(chat_id = %chat_id, error = %e, "leave emit failed");
            }
        }
    }

    /// Joins a room, leaving the previous one first.
    pub async fn join(&mut self, transport: &dyn EventTransport, chat_id: ChatId) {
        self.leave(transport).await;
        debug!(chat_id = %chat_id, from = %RoomState::NotJoined, to = %RoomState::Joined, "joining room");
        if let Err(e) = transport
            .emit(ClientEvent::JoinChatRoom {
                chat_id: chat_id.clone(),
            })
            .await
        {
            warn!(chat_id = %chat_id, error = %e, "join emit failed");
        }
        self.joined = Some(chat_id);
    }

    /// Forgets the membership without emitting a leave. Used after a
    /// reconnect, when the server has already dropped the subscription.
    pub fn reset(&mut self) {
        self.joined = None;
    }
}

/// Outcome of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SendStatus {
    /// The message was emitted; it becomes visible when its
    /// `message_received` echo arrives.
    #[strum(serialize = "sent")]
    Sent,
    /// The transport was not connected; nothing was queued or buffered.
    #[strum(serialize = "dropped")]
    Dropped,
}

/// Manages focus, history pagination, and mark-read for one conversation at
/// a time. Transport access is passed per call so the engine keeps sole
/// ownership of the connection.
pub struct ActiveController {
    store: SharedStore,
    api: ApiClient,
    current_user: UserId,
    page_size: u32,
    room: RoomMembership,
}

impl ActiveController {
    pub fn new(store: SharedStore, api: ApiClient, current_user: UserId, page_size: u32) -> Self {
        Self {
            store,
            api,
            current_user,
            page_size,
            room: RoomMembership::default(),
        }
    }

    pub fn room(&self) -> &RoomMembership {
        &self.room
    }

    /// Focuses a conversation: joins its room (leaving the previous one),
    /// resets the cursor, optimistically zeroes the unread counter, loads
    /// the first history page, then issues the best-effort mark-read.
    ///
    /// A failed page fetch surfaces as `Err` with focus already moved; the
    /// caller owns the retry affordance (reselecting the same id re-runs the
    /// whole sequence, with a symmetric leave/join pair).
    pub async fn select_conversation(
        &mut self,
        transport: &dyn EventTransport,
        chat_id: &ChatId,
    ) -> Result<(), VestibuleError> {
        let current_user = self.current_user.clone();
        let id = chat_id.clone();
        let had_unread = self
            .store
            .update(move |cache| {
                let unread = cache
                    .conversation_mut(&id)
                    .map(|c| {
                        let unread = c.unread_for(&current_user) > 0;
                        if unread {
                            c.unread_counts.insert(current_user.clone(), 0);
                        }
                        unread
                    })
                    .ok_or(())?;
                cache.focus(id);
                Ok::<bool, ()>(unread)
            })
            .await
            .map_err(|()| VestibuleError::UnknownConversation(chat_id.0.clone()))?;

        self.room.join(transport, chat_id.clone()).await;
        info!(chat_id = %chat_id, had_unread, "conversation focused");

        // The optimistic zero stays regardless of how this call goes.
        if had_unread
            && let Err(e) = self.api.mark_read(chat_id).await
        {
            warn!(chat_id = %chat_id, error = %e, "mark-read failed, keeping optimistic zero");
        }

        let page = self.api.fetch_messages(chat_id, self.page_size, 0).await?;
        let id = chat_id.clone();
        self.store
            .update(move |cache| {
                // Focus may have moved while the fetch was in flight.
                if cache.is_active(&id) {
                    cache.prepend_page(page);
                }
            })
            .await;
        Ok(())
    }

    /// Clears focus and leaves the room.
    pub async fn clear_selection(&mut self, transport: &dyn EventTransport) {
        self.room.leave(transport).await;
        self.store.update(|cache| cache.clear_focus()).await;
    }

    /// Loads one older page of history for the focused conversation.
    ///
    /// Valid only while the most recent fetch returned an exactly full page;
    /// otherwise this is a no-op and returns `Ok(false)`. On success the
    /// older page is prepended (existing messages are never dropped or
    /// duplicated) and `Ok(true)` is returned.
    pub async fn load_more_messages(&mut self) -> Result<bool, VestibuleError> {
        let snapshot = self.store.snapshot().await;
        let Some(chat_id) = snapshot.active.clone() else {
            return Err(VestibuleError::NoActiveConversation);
        };
        if snapshot.cursor.last_page_len != Some(self.page_size) {
            debug!(
                chat_id = %chat_id,
                last_page_len = ?snapshot.cursor.last_page_len,
                "last page not full, load-more is a no-op"
            );
            return Ok(false);
        }

        let skip = snapshot.cursor.skip + self.page_size;
        let page = self.api.fetch_messages(&chat_id, self.page_size, skip).await?;
        self.store
            .update(move |cache| {
                if cache.is_active(&chat_id) {
                    cache.cursor.skip = skip;
                    cache.prepend_page(page);
                }
            })
            .await;
        Ok(true)
    }

    /// Sends a message to the focused conversation.
    ///
    /// Requires a live transport; when disconnected the call is a no-op
    /// reported as [`SendStatus::Dropped`]. No optimistic local message is
    /// inserted; the message appears when its echo event arrives.
    pub async fn send_message(
        &self,
        transport: &dyn EventTransport,
        text: impl Into<String>,
        files: Vec<String>,
    ) -> Result<SendStatus, VestibuleError> {
        let chat_id = self
            .store
            .active()
            .await
            .ok_or(VestibuleError::NoActiveConversation)?;

        if !transport.is_connected() {
            info!(chat_id = %chat_id, "transport down, dropping send");
            return Ok(SendStatus::Dropped);
        }

        transport
            .emit(ClientEvent::SendMessage {
                chat_id: chat_id.clone(),
                text: text.into(),
                files,
            })
            .await?;
        debug!(chat_id = %chat_id, "message emitted");
        Ok(SendStatus::Sent)
    }

    /// Deletes a conversation. The store change applies only after the REST
    /// delete succeeds; if it was focused, focus clears and its room is left.
    pub async fn delete_conversation(
        &mut self,
        transport: &dyn EventTransport,
        chat_id: &ChatId,
    ) -> Result<(), VestibuleError> {
        self.api.delete_conversation(chat_id).await?;
        if self.room.joined_room() == Some(chat_id) {
            self.room.leave(transport).await;
        }
        let id = chat_id.clone();
        self.store
            .update(move |cache| cache.remove_conversation(&id))
            .await;
        info!(chat_id = %chat_id, "conversation deleted");
        Ok(())
    }

    /// Restores state after a resumed connection: the server dropped all
    /// room subscriptions, so the membership is reset and re-joined, and the
    /// focused conversation's window is reloaded at cursor zero.
    pub async fn resync(&mut self, transport: &dyn EventTransport) -> Result<(), VestibuleError> {
        let Some(chat_id) = self.store.active().await else {
            return Ok(());
        };
        self.room.reset();
        self.room.join(transport, chat_id.clone()).await;

        let page = self.api.fetch_messages(&chat_id, self.page_size, 0).await?;
        let id = chat_id.clone();
        self.store
            .update(move |cache| {
                if cache.is_active(&id) {
                    cache.page.clear();
                    cache.cursor.skip = 0;
                    cache.prepend_page(page);
                }
            })
            .await;
        info!(chat_id = %chat_id, "focused conversation resynced");
        Ok(())
    }

    /// Leaves the room on teardown without touching focus state.
    pub async fn teardown(&mut self, transport: &dyn EventTransport) {
        self.room.leave(transport).await;
    }
}
