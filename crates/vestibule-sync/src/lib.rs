// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Vestibule sync engine: cache store, event reconciler, and
//! active-conversation controller, wired into one event loop.
//!
//! [`SyncEngine`] owns the transport, consumes its ordered event stream,
//! routes server events through the [`Reconciler`], and drives the
//! [`Notifier`] for qualifying messages. Focus, pagination, sending, and
//! conversation management are exposed as async methods that all mutate the
//! shared store through its single writer path.

pub mod active;
pub mod reconcile;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vestibule_api::ApiClient;
use vestibule_core::{
    ChatId, ClientEvent, EventTransport, ServerEvent, TransportEvent, UserId, UserSummary,
    VestibuleError,
};
use vestibule_notify::Notifier;

pub use active::{ActiveController, RoomMembership, RoomState, SendStatus};
pub use reconcile::{MessageDisposition, RecentIds, Reconciler};
pub use store::{CacheStore, PageCursor, SharedStore};

/// Cache and reconciliation tuning, mirrored from `[sync]` config.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Fixed message page size for history fetches and load-more.
    pub page_size: u32,
    /// Capacity of the recently-seen message id buffer.
    pub seen_cap: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            seen_cap: 64,
        }
    }
}

/// The realtime chat synchronization engine.
pub struct SyncEngine {
    transport: Box<dyn EventTransport>,
    api: ApiClient,
    store: SharedStore,
    reconciler: Reconciler,
    controller: ActiveController,
    notifier: Arc<Notifier>,
    current_user: UserSummary,
}

impl SyncEngine {
    /// Bootstraps the engine: resolves the current user, fetches the
    /// conversation list, seeds the store, and starts the transport's
    /// connect cycle (which proceeds in the background).
    pub async fn bootstrap(
        api: ApiClient,
        mut transport: Box<dyn EventTransport>,
        notifier: Arc<Notifier>,
        options: EngineOptions,
    ) -> Result<Self, VestibuleError> {
        let current_user = api.me().await?;
        let conversations = api.list_conversations().await?;
        info!(
            user_id = %current_user.id,
            conversations = conversations.len(),
            "engine bootstrapped"
        );

        let store = SharedStore::new(CacheStore::with_conversations(conversations));
        let reconciler = Reconciler::new(current_user.id.clone(), options.seen_cap);
        let controller = ActiveController::new(
            store.clone(),
            api.clone(),
            current_user.id.clone(),
            options.page_size,
        );

        transport.connect().await?;

        Ok(Self {
            transport,
            api,
            store,
            reconciler,
            controller,
            notifier,
            current_user,
        })
    }

    pub fn current_user(&self) -> &UserSummary {
        &self.current_user
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Runs the event loop until cancellation, then tears down the room
    /// membership and the transport.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), VestibuleError> {
        info!("sync engine running");

        loop {
            tokio::select! {
                event = self.transport.next_event() => match event {
                    Ok(event) => self.handle_transport_event(event).await,
                    Err(e) => {
                        warn!(error = %e, "transport event stream ended");
                        break;
                    }
                },
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping sync engine");
                    break;
                }
            }
        }

        self.shutdown().await?;
        info!("sync engine stopped");
        Ok(())
    }

    /// Leaves any joined room and closes the transport. Used by the run
    /// loop on exit and by one-shot commands that never enter the loop.
    pub async fn shutdown(&mut self) -> Result<(), VestibuleError> {
        self.controller.teardown(&*self.transport).await;
        self.transport.disconnect().await
    }

    /// Applies one transport event. Public so tests and one-shot commands
    /// can feed events without running the full loop.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Up { resumed } => {
                // Presence membership does not survive a connection, so a
                // fresh snapshot is requested on every Up.
                if let Err(e) = self.transport.emit(ClientEvent::GetOnlineUsers).await {
                    warn!(error = %e, "presence snapshot request failed");
                }
                if resumed {
                    info!("connection resumed, resyncing from server truth");
                    self.resync().await;
                }
            }
            TransportEvent::Down { reason } => {
                // Silent degradation: realtime is an enhancement.
                debug!(%reason, "transport down");
            }
            TransportEvent::Server(event) => self.handle_server_event(event).await,
        }
    }

    async fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::MessageReceived { message, sender } => {
                let disposition = self
                    .reconciler
                    .handle_message(&self.store, message.clone(), &sender)
                    .await;
                match disposition {
                    MessageDisposition::Applied { notify: true } => {
                        self.notifier.dispatch(&sender, &message).await;
                    }
                    MessageDisposition::Applied { notify: false }
                    | MessageDisposition::Duplicate => {}
                    MessageDisposition::UnknownConversation => {
                        debug!(chat_id = %message.chat_id, "message for unknown conversation, refetching list");
                        self.refresh_conversations().await;
                        if sender.id != self.current_user.id {
                            self.notifier.dispatch(&sender, &message).await;
                        }
                    }
                }
            }
            ServerEvent::ReadReceipt { chat_id, user_id } => {
                self.reconciler
                    .handle_read_receipt(&self.store, chat_id, user_id)
                    .await;
            }
            ServerEvent::UserOnline { user_id } => {
                self.reconciler.handle_user_online(&self.store, user_id).await;
            }
            ServerEvent::UserOffline { user_id } => {
                self.reconciler
                    .handle_user_offline(&self.store, user_id)
                    .await;
            }
            ServerEvent::OnlineUsers { user_ids } => {
                self.reconciler
                    .handle_online_users(&self.store, user_ids)
                    .await;
            }
        }
    }

    /// Processes transport events until the connection is up, a connect
    /// cycle fails for good, or the timeout elapses. Returns whether the
    /// transport came up. Used by one-shot commands that must not emit
    /// before the connection exists.
    pub async fn await_connection(&mut self, timeout: Duration) -> Result<bool, VestibuleError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let event = tokio::select! {
                event = self.transport.next_event() => event?,
                _ = tokio::time::sleep_until(deadline) => return Ok(false),
            };
            let up = matches!(event, TransportEvent::Up { .. });
            let dead = matches!(
                event,
                TransportEvent::Down {
                    reason: vestibule_core::DownReason::RetriesExhausted
                        | vestibule_core::DownReason::Disconnected
                }
            );
            self.handle_transport_event(event).await;
            if up {
                return Ok(true);
            }
            if dead {
                return Ok(false);
            }
        }
    }

    /// Refetches the conversation list and, when a conversation is focused,
    /// reloads its window and rejoins its room. Failures are logged; the
    /// next resumed connection tries again.
    async fn resync(&mut self) {
        self.refresh_conversations().await;
        if let Err(e) = self.controller.resync(&*self.transport).await {
            warn!(error = %e, "focused conversation resync failed");
        }
    }

    async fn refresh_conversations(&mut self) {
        match self.api.list_conversations().await {
            Ok(conversations) => self.store.replace_conversations(conversations).await,
            Err(e) => warn!(error = %e, "conversation list refetch failed"),
        }
    }

    // ---- focus, pagination, sending ----

    /// See [`ActiveController::select_conversation`].
    pub async fn select_conversation(&mut self, chat_id: &ChatId) -> Result<(), VestibuleError> {
        self.controller
            .select_conversation(&*self.transport, chat_id)
            .await
    }

    /// See [`ActiveController::clear_selection`].
    pub async fn clear_selection(&mut self) {
        self.controller.clear_selection(&*self.transport).await;
    }

    /// See [`ActiveController::load_more_messages`].
    pub async fn load_more_messages(&mut self) -> Result<bool, VestibuleError> {
        self.controller.load_more_messages().await
    }

    /// See [`ActiveController::send_message`].
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        files: Vec<String>,
    ) -> Result<SendStatus, VestibuleError> {
        self.controller
            .send_message(&*self.transport, text, files)
            .await
    }

    /// See [`ActiveController::delete_conversation`].
    pub async fn delete_conversation(&mut self, chat_id: &ChatId) -> Result<(), VestibuleError> {
        self.controller
            .delete_conversation(&*self.transport, chat_id)
            .await
    }

    // ---- conversation management ----
    // Store changes apply only after the REST call succeeds; a rejected
    // mutation leaves nothing to roll back.

    /// Opens (or returns) the direct conversation with a user.
    pub async fn initiate_direct(&self, user_id: &UserId) -> Result<ChatId, VestibuleError> {
        let conversation = self.api.initiate_direct(user_id).await?;
        let id = conversation.id.clone();
        self.store
            .update(move |cache| cache.upsert_conversation(conversation))
            .await;
        Ok(id)
    }

    /// Creates a group conversation.
    pub async fn create_group(
        &self,
        group_name: &str,
        participant_ids: &[UserId],
    ) -> Result<ChatId, VestibuleError> {
        let conversation = self.api.create_group(group_name, participant_ids).await?;
        let id = conversation.id.clone();
        self.store
            .update(move |cache| cache.upsert_conversation(conversation))
            .await;
        Ok(id)
    }

    /// Renames a group and/or replaces its picture.
    pub async fn update_group(
        &self,
        chat_id: &ChatId,
        group_name: Option<&str>,
        group_picture: Option<&str>,
    ) -> Result<(), VestibuleError> {
        let conversation = self
            .api
            .update_group(chat_id, group_name, group_picture)
            .await?;
        self.store
            .update(move |cache| cache.upsert_conversation(conversation))
            .await;
        Ok(())
    }

    /// Adds a user to a group conversation.
    pub async fn add_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<(), VestibuleError> {
        let conversation = self.api.add_participant(chat_id, user_id).await?;
        self.store
            .update(move |cache| cache.upsert_conversation(conversation))
            .await;
        Ok(())
    }

    /// Removes a user from a group conversation.
    pub async fn remove_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<(), VestibuleError> {
        let conversation = self.api.remove_participant(chat_id, user_id).await?;
        self.store
            .update(move |cache| cache.upsert_conversation(conversation))
            .await;
        Ok(())
    }

    // ---- presence ----

    /// Requests a fresh presence snapshot from the server.
    pub async fn request_online_users(&self) -> Result<(), VestibuleError> {
        self.transport.emit(ClientEvent::GetOnlineUsers).await
    }

    /// Membership test against the last presence snapshot.
    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.store.snapshot().await.online.contains(user_id)
    }

    /// Sum of the current user's unread counters across all conversations.
    pub async fn unread_total(&self) -> u32 {
        self.store.unread_total(&self.current_user.id).await
    }
}
