// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event reconciler: the single authority for turning inbound realtime
//! events into cache mutations.
//!
//! Events are applied strictly in transport-arrival order; no reordering by
//! timestamp is performed. The backend may deliver the same message twice
//! (once via the conversation room, once via the personal room), so every
//! `message_received` passes a dedup gate before it touches the store: a
//! bounded recently-seen-id buffer plus a scan of the loaded page.
//!
//! The reconciler never performs I/O. It reports a [`MessageDisposition`]
//! per event so the engine can drive follow-up side effects (notification
//! dispatch, list refetch for unknown conversations) and tests can observe
//! decisions without a real alert surface.

use std::collections::VecDeque;

use tracing::{debug, trace};
use vestibule_core::{ChatId, Message, MessageId, UserId, UserSummary};

use crate::store::SharedStore;

/// Bounded buffer of recently seen message ids, oldest-evicted-first.
///
/// The capacity is a tuning constant, not a load-bearing invariant: any
/// bound comfortably larger than the duplicate-delivery window works.
#[derive(Debug)]
pub struct RecentIds {
    ids: VecDeque<MessageId>,
    cap: usize,
}

impl RecentIds {
    pub fn new(cap: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(cap.min(1024)),
            cap: cap.max(1),
        }
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Records an id. Returns false when it was already present.
    pub fn insert(&mut self, id: MessageId) -> bool {
        if self.contains(&id) {
            return false;
        }
        if self.ids.len() == self.cap {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of reconciling one `message_received` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageDisposition {
    /// The event was applied to the store.
    Applied {
        /// True when the event qualifies for a user-facing alert: sender is
        /// not the current user and the conversation is not focused.
        notify: bool,
    },
    /// The message id was already seen or already loaded; dropped without
    /// side effects.
    Duplicate,
    /// The owning conversation is not in the local list. The store was not
    /// touched; the engine refetches the conversation list to pick it up.
    UnknownConversation,
}

impl MessageDisposition {
    pub fn should_notify(&self) -> bool {
        matches!(self, Self::Applied { notify: true })
    }
}

/// Applies inbound realtime events to the [`SharedStore`].
pub struct Reconciler {
    current_user: UserId,
    seen: RecentIds,
}

impl Reconciler {
    pub fn new(current_user: UserId, seen_cap: usize) -> Self {
        Self {
            current_user,
            seen: RecentIds::new(seen_cap),
        }
    }

    pub fn current_user(&self) -> &UserId {
        &self.current_user
    }

    /// Reconciles one inbound message.
    ///
    /// On acceptance: the owning conversation's `last_message` and
    /// `updated_at` are replaced and it moves to the front of the list; the
    /// current user's unread counter increments unless the sender is the
    /// current user or the conversation is focused; the message is appended
    /// to the loaded page when the conversation is focused (this is also how
    /// the sender's own messages become visible, since sending performs no
    /// optimistic insert).
    pub async fn handle_message(
        &mut self,
        store: &SharedStore,
        message: Message,
        sender: &UserSummary,
    ) -> MessageDisposition {
        if self.seen.contains(&message.id) {
            trace!(message_id = %message.id, "duplicate via seen buffer, dropping");
            return MessageDisposition::Duplicate;
        }

        let message_id = message.id.clone();
        let current_user = self.current_user.clone();
        let sender_id = sender.id.clone();
        let disposition = store
            .update(move |cache| {
                if cache.page_contains(&message.id) {
                    return MessageDisposition::Duplicate;
                }
                let chat_id = message.chat_id.clone();
                let active = cache.is_active(&chat_id);

                let Some(conversation) = cache.conversation_mut(&chat_id) else {
                    return MessageDisposition::UnknownConversation;
                };

                conversation.updated_at = message.created_at;
                conversation.last_message = Some(message.clone());

                let from_self = sender_id == current_user;
                if !from_self && !active {
                    *conversation
                        .unread_counts
                        .entry(current_user.clone())
                        .or_insert(0) += 1;
                }

                cache.move_to_front(&chat_id);
                if active {
                    cache.page.push(message);
                }

                MessageDisposition::Applied {
                    notify: !from_self && !active,
                }
            })
            .await;

        // Record the id even when the conversation was unknown, so the
        // second delivery of the same message does not refetch again.
        if disposition != MessageDisposition::Duplicate {
            self.seen.insert(message_id);
        }

        disposition
    }

    /// Marks every loaded message of a conversation as read by `user_id`.
    /// Self receipts are skipped; the local mark-read path already handled
    /// the current user's state.
    pub async fn handle_read_receipt(
        &mut self,
        store: &SharedStore,
        chat_id: ChatId,
        user_id: UserId,
    ) {
        if user_id == self.current_user {
            trace!(chat_id = %chat_id, "self read receipt, skipping");
            return;
        }
        store
            .update(move |cache| {
                if !cache.is_active(&chat_id) {
                    return;
                }
                for message in &mut cache.page {
                    message.mark_read_by(&user_id);
                }
                debug!(chat_id = %chat_id, user_id = %user_id, "read receipt applied");
            })
            .await;
    }

    /// Adds one user to the presence set. Idempotent.
    pub async fn handle_user_online(&mut self, store: &SharedStore, user_id: UserId) {
        store
            .update(move |cache| {
                cache.online.insert(user_id);
            })
            .await;
    }

    /// Removes one user from the presence set. Idempotent.
    pub async fn handle_user_offline(&mut self, store: &SharedStore, user_id: UserId) {
        store
            .update(move |cache| {
                cache.online.remove(&user_id);
            })
            .await;
    }

    /// Replaces the presence set with a full snapshot.
    pub async fn handle_online_users(&mut self, store: &SharedStore, user_ids: Vec<UserId>) {
        store
            .update(move |cache| {
                cache.online = user_ids.into_iter().collect();
            })
            .await;
    }
}
