// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The local cache store and its single-writer wrapper.
//!
//! [`CacheStore`] holds everything the sync layer knows locally: the
//! conversation list (most-recently-active first), the focused conversation's
//! loaded message page and pagination cursor, and the online presence set.
//!
//! All mutation routes through [`SharedStore::update`]. The store is shared
//! between the reconciler, the active-conversation controller, and completion
//! handlers for REST mutations; a single designated update path is what keeps
//! interleaved async callbacks from losing writes. Readers get cloned
//! snapshots and must never mutate them in place.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, trace};
use vestibule_core::{ChatId, Conversation, Message, MessageId, UserId};

/// Capacity of the change-notification channel. Watchers that fall behind
/// miss ticks, not data; they refetch a snapshot on the next tick.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Pagination cursor for the focused conversation's message history.
///
/// `skip` counts from the newest message backwards. `last_page_len` is the
/// length of the most recently fetched page; load-more is valid only while
/// it equals the configured page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub skip: u32,
    pub last_page_len: Option<u32>,
}

/// The normalized local cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    /// Conversation list, most-recently-active first.
    pub conversations: Vec<Conversation>,
    /// The focused conversation, if any.
    pub active: Option<ChatId>,
    /// Loaded message page for the focused conversation, oldest first.
    pub page: Vec<Message>,
    /// Pagination cursor for the focused conversation.
    pub cursor: PageCursor,
    /// Participant ids currently connected.
    pub online: HashSet<UserId>,
}

impl CacheStore {
    /// Creates a store seeded with a freshly fetched conversation list.
    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            ..Self::default()
        }
    }

    /// Looks up a conversation by id.
    pub fn conversation(&self, id: &ChatId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Mutable lookup, used by the reconciler's update closures.
    pub fn conversation_mut(&mut self, id: &ChatId) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| &c.id == id)
    }

    /// True when `id` is the focused conversation.
    pub fn is_active(&self, id: &ChatId) -> bool {
        self.active.as_ref() == Some(id)
    }

    /// True when the loaded page already holds a message with this id.
    pub fn page_contains(&self, id: &MessageId) -> bool {
        self.page.iter().any(|m| &m.id == id)
    }

    /// Moves the conversation to the front of the list, preserving the
    /// relative order of all others. No-op when the id is unknown or the
    /// conversation is already first.
    pub fn move_to_front(&mut self, id: &ChatId) {
        if let Some(pos) = self.conversations.iter().position(|c| &c.id == id)
            && pos > 0
        {
            let conversation = self.conversations.remove(pos);
            self.conversations.insert(0, conversation);
        }
    }

    /// Inserts a new conversation at the front, or replaces the cached copy
    /// in place when the id already exists.
    pub fn upsert_conversation(&mut self, conversation: Conversation) {
        match self.conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => self.conversations.insert(0, conversation),
        }
    }

    /// Removes a conversation; clears focus, page, and cursor if it was the
    /// focused one. Returns true when something was removed.
    pub fn remove_conversation(&mut self, id: &ChatId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| &c.id != id);
        if self.is_active(id) {
            self.active = None;
            self.page.clear();
            self.cursor = PageCursor::default();
        }
        before != self.conversations.len()
    }

    /// Points focus at a conversation, clearing the loaded page and resetting
    /// the cursor. The caller fetches the first page afterwards.
    pub fn focus(&mut self, id: ChatId) {
        self.active = Some(id);
        self.page.clear();
        self.cursor = PageCursor::default();
    }

    /// Clears focus, the loaded page, and the cursor.
    pub fn clear_focus(&mut self) {
        self.active = None;
        self.page.clear();
        self.cursor = PageCursor::default();
    }

    /// Prepends an older page of history, skipping any ids already loaded.
    /// Records the raw fetched length for the load-more validity check.
    pub fn prepend_page(&mut self, older: Vec<Message>) {
        self.cursor.last_page_len = Some(older.len() as u32);
        let fresh: Vec<Message> = older
            .into_iter()
            .filter(|m| !self.page_contains(&m.id))
            .collect();
        trace!(count = fresh.len(), "prepending history page");
        self.page.splice(0..0, fresh);
    }

    /// Sum of the current user's unread counters across the list.
    pub fn unread_total(&self, user: &UserId) -> u32 {
        self.conversations.iter().map(|c| c.unread_for(user)).sum()
    }
}

/// The single-writer wrapper around [`CacheStore`].
///
/// Cloning a `SharedStore` clones the handle, not the data. Every mutation
/// goes through [`update`](Self::update); every read takes a
/// [`snapshot`](Self::snapshot).
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CacheStore>>,
    changed: broadcast::Sender<()>,
}

impl SharedStore {
    pub fn new(store: CacheStore) -> Self {
        let (changed, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(store)),
            changed,
        }
    }

    /// Applies one mutation through the designated writer path and notifies
    /// watchers. The closure runs under the store lock; keep it short and
    /// never await inside it.
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CacheStore) -> R,
    {
        let result = {
            let mut store = self.inner.lock().await;
            f(&mut store)
        };
        // Nobody listening is fine; watch surfaces come and go.
        let _ = self.changed.send(());
        result
    }

    /// Returns a cloned snapshot for reading. Mutating the snapshot has no
    /// effect on the shared state.
    pub async fn snapshot(&self) -> CacheStore {
        self.inner.lock().await.clone()
    }

    /// Subscribes to change ticks emitted after every update.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changed.subscribe()
    }

    /// Convenience read: the focused conversation id, if any.
    pub async fn active(&self) -> Option<ChatId> {
        self.inner.lock().await.active.clone()
    }

    /// Convenience read: unread total for one user.
    pub async fn unread_total(&self, user: &UserId) -> u32 {
        self.inner.lock().await.unread_total(user)
    }
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore").finish_non_exhaustive()
    }
}

impl SharedStore {
    /// Replaces the conversation list wholesale (bootstrap and resync), then
    /// re-sorts nothing: the server returns most-recently-active order.
    pub async fn replace_conversations(&self, conversations: Vec<Conversation>) {
        debug!(count = conversations.len(), "replacing conversation list");
        self.update(|store| store.conversations = conversations).await;
    }
}
