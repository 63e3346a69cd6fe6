// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete sync stack: a wiremock backend with
//! the REST routes the engine touches, a real `ApiClient` pointed at it, a
//! [`MockTransport`], and a [`MockAlertSink`] behind the notifier. Provides
//! `deliver()` to drive server events through the full pipeline in tests.

use std::sync::Arc;

use vestibule_api::ApiClient;
use vestibule_core::{ServerEvent, TransportEvent, VestibuleError};
use vestibule_notify::Notifier;
use vestibule_sync::{EngineOptions, SyncEngine};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::mock_sink::MockAlertSink;
use crate::mock_transport::MockTransport;

/// Builder for creating test environments with configurable backend state.
pub struct TestHarnessBuilder {
    me: serde_json::Value,
    conversations: Vec<serde_json::Value>,
    message_pages: Vec<(String, u32, serde_json::Value)>,
    page_size: u32,
    seen_cap: usize,
    sound: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            me: crate::fixtures::user_json("u1", "Asha"),
            conversations: Vec::new(),
            message_pages: Vec::new(),
            page_size: 20,
            seen_cap: 64,
            sound: false,
        }
    }

    /// Set the authenticated user returned by `GET /users/me`.
    pub fn with_me(mut self, me: serde_json::Value) -> Self {
        self.me = me;
        self
    }

    /// Add a conversation to the backend's list response.
    pub fn with_conversation(mut self, conversation: serde_json::Value) -> Self {
        self.conversations.push(conversation);
        self
    }

    /// Script one page of message history for a conversation at a skip
    /// offset. Unscripted pages resolve to an empty array.
    pub fn with_message_page(
        mut self,
        chat_id: &str,
        skip: u32,
        messages: serde_json::Value,
    ) -> Self {
        self.message_pages
            .push((chat_id.to_string(), skip, messages));
        self
    }

    /// Set the history page size the engine fetches with.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the recently-seen dedup buffer capacity.
    pub fn with_seen_cap(mut self, seen_cap: usize) -> Self {
        self.seen_cap = seen_cap;
        self
    }

    /// Enable the audible cue alongside toasts.
    pub fn with_sound(mut self) -> Self {
        self.sound = true;
        self
    }

    /// Build the harness: start the mock backend, mount the routes, and
    /// bootstrap the engine over a connected mock transport.
    pub async fn build(self) -> Result<TestHarness, VestibuleError> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.me))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chats"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::Value::Array(
                    self.conversations,
                )),
            )
            .mount(&server)
            .await;
        // Scripted pages first; the catch-all below answers the rest.
        for (chat_id, skip, messages) in self.message_pages {
            Mock::given(method("GET"))
                .and(path("/messages"))
                .and(query_param("chat_id", chat_id))
                .and(query_param("skip", skip.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(messages))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/chats/[^/]+/read$"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/chats/[^/]+$"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Some("test-token"), 5)?;
        let transport = MockTransport::new();
        let sink = Arc::new(MockAlertSink::new());
        let notifier = Arc::new(Notifier::new(sink.clone(), true, self.sound));

        let engine = SyncEngine::bootstrap(
            api,
            Box::new(transport.clone()),
            notifier.clone(),
            EngineOptions {
                page_size: self.page_size,
                seen_cap: self.seen_cap,
            },
        )
        .await?;

        Ok(TestHarness {
            engine,
            transport,
            sink,
            notifier,
            server,
        })
    }
}

/// A complete test environment: bootstrapped engine, scripted backend,
/// shared transport and sink handles for assertions.
pub struct TestHarness {
    /// The bootstrapped sync engine under test.
    pub engine: SyncEngine,
    /// Handle to the transport the engine owns; inject events and inspect
    /// emitted client events here.
    pub transport: MockTransport,
    /// The alert sink behind the notifier.
    pub sink: Arc<MockAlertSink>,
    /// The notifier, for suppression toggling.
    pub notifier: Arc<Notifier>,
    /// The mock backend, for mounting additional routes mid-test.
    pub server: MockServer,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Push one server event through the engine's reconciliation pipeline.
    pub async fn deliver(&mut self, event: ServerEvent) {
        self.engine
            .handle_transport_event(TransportEvent::Server(event))
            .await;
    }

    /// Push a raw transport lifecycle event through the engine.
    pub async fn deliver_transport(&mut self, event: TransportEvent) {
        self.engine.handle_transport_event(event).await;
    }
}
