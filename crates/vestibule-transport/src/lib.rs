// SPDX-FileCopyrightText: 2026 Vestibule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket event transport for the Vestibule sync engine.
//!
//! Implements [`EventTransport`] over tokio-tungstenite: authenticated
//! handshake, personal-room join on every connect, bounded reconnect with
//! capped exponential backoff, and a single ordered stream of lifecycle and
//! server events. A failed connect cycle leaves the transport inert until
//! the consumer calls [`EventTransport::connect`] again.

pub mod backoff;
pub mod wire;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vestibule_core::{
    ClientEvent, DownReason, EventTransport, TransportEvent, UserId, VestibuleError,
};

pub use backoff::ReconnectPolicy;

/// Buffer size for the inbound transport-event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Buffer size for the outbound client-event channel.
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Websocket transport implementing [`EventTransport`].
///
/// Owns a background io task per connection cycle. The task establishes the
/// socket (retrying per [`ReconnectPolicy`]), joins the user's personal room,
/// then pumps frames both ways until the connection drops or the transport
/// is torn down. Mid-session drops start a fresh retry cycle; an exhausted
/// cycle ends the task.
pub struct SocketTransport {
    url: String,
    auth_token: Option<String>,
    user_id: UserId,
    policy: ReconnectPolicy,
    connected: Arc<AtomicBool>,
    ever_connected: Arc<AtomicBool>,
    event_tx: mpsc::Sender<TransportEvent>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<TransportEvent>>,
    out_tx: mpsc::Sender<ClientEvent>,
    out_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<ClientEvent>>>,
    cancel: CancellationToken,
    io_handle: Option<tokio::task::JoinHandle<()>>,
}

impl SocketTransport {
    /// Creates a disconnected transport for the given user.
    ///
    /// # Arguments
    /// * `url` - Socket endpoint, e.g. `ws://localhost:5000/ws`
    /// * `auth_token` - Bearer token sent on the handshake, if present
    /// * `user_id` - Owner of the personal room joined on every connect
    /// * `policy` - Retry budget and backoff bounds per connect cycle
    pub fn new(
        url: impl Into<String>,
        auth_token: Option<&str>,
        user_id: UserId,
        policy: ReconnectPolicy,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);

        Self {
            url: url.into(),
            auth_token: auth_token.map(str::to_string),
            user_id,
            policy,
            connected: Arc::new(AtomicBool::new(false)),
            ever_connected: Arc::new(AtomicBool::new(false)),
            event_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
            out_tx,
            out_rx: Arc::new(tokio::sync::Mutex::new(out_rx)),
            cancel: CancellationToken::new(),
            io_handle: None,
        }
    }
}

#[async_trait]
impl EventTransport for SocketTransport {
    async fn connect(&mut self) -> Result<(), VestibuleError> {
        if let Some(handle) = &self.io_handle
            && !handle.is_finished()
        {
            debug!("connect called while io task is live, ignoring");
            return Ok(());
        }

        // A previous cycle may have cancelled this token.
        self.cancel = CancellationToken::new();

        let io = IoTask {
            url: self.url.clone(),
            auth_token: self.auth_token.clone(),
            user_id: self.user_id.clone(),
            policy: self.policy,
            connected: Arc::clone(&self.connected),
            ever_connected: Arc::clone(&self.ever_connected),
            event_tx: self.event_tx.clone(),
            out_rx: Arc::clone(&self.out_rx),
            cancel: self.cancel.clone(),
        };

        self.io_handle = Some(tokio::spawn(io.run()));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), VestibuleError> {
        self.cancel.cancel();
        self.connected.store(false, Ordering::SeqCst);
        if let Some(handle) = self.io_handle.take() {
            let _ = handle.await;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn emit(&self, event: ClientEvent) -> Result<(), VestibuleError> {
        if !self.is_connected() {
            return Err(VestibuleError::NotConnected);
        }
        self.out_tx
            .send(event)
            .await
            .map_err(|_| VestibuleError::Transport {
                message: "outbound channel closed".into(),
                source: None,
            })
    }

    async fn next_event(&self) -> Result<TransportEvent, VestibuleError> {
        let mut rx = self.event_rx.lock().await;
        rx.recv().await.ok_or_else(|| VestibuleError::Transport {
            message: "transport event channel closed".into(),
            source: None,
        })
    }
}

/// State captured by the background io task.
struct IoTask {
    url: String,
    auth_token: Option<String>,
    user_id: UserId,
    policy: ReconnectPolicy,
    connected: Arc<AtomicBool>,
    ever_connected: Arc<AtomicBool>,
    event_tx: mpsc::Sender<TransportEvent>,
    out_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<ClientEvent>>>,
    cancel: CancellationToken,
}

impl IoTask {
    async fn run(self) {
        // Held for the task's lifetime so only one cycle drains outbound events.
        let mut out_rx = self.out_rx.lock().await;

        loop {
            let Some(stream) = self.establish_with_retries().await else {
                return;
            };

            let reason = self.pump(stream, &mut out_rx).await;
            self.connected.store(false, Ordering::SeqCst);

            match reason {
                DownReason::ConnectionLost => {
                    if !self
                        .deliver(TransportEvent::Down {
                            reason: DownReason::ConnectionLost,
                        })
                        .await
                    {
                        return;
                    }
                    info!("connection lost, starting reconnect cycle");
                }
                reason => {
                    // Teardown path: the consumer may already be gone.
                    let _ = self.event_tx.try_send(TransportEvent::Down { reason });
                    return;
                }
            }
        }
    }

    /// Delivers an event to the consumer. Returns false when delivery is no
    /// longer possible: the consumer hung up, or teardown was requested while
    /// the channel was full.
    async fn deliver(&self, event: TransportEvent) -> bool {
        tokio::select! {
            result = self.event_tx.send(event) => result.is_ok(),
            _ = self.cancel.cancelled() => false,
        }
    }

    /// Runs one bounded retry cycle. Returns the stream on success, or None
    /// once the budget is exhausted or teardown was requested.
    async fn establish_with_retries(&self) -> Option<WsStream> {
        for attempt in 1..=self.policy.max_attempts {
            if self.cancel.is_cancelled() {
                let _ = self.event_tx.try_send(TransportEvent::Down {
                    reason: DownReason::Disconnected,
                });
                return None;
            }

            match establish(&self.url, self.auth_token.as_deref()).await {
                Ok(stream) => return Some(stream),
                Err(e) => {
                    warn!(attempt, error = %e, "socket connect attempt failed");
                }
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancel.cancelled() => {
                        let _ = self.event_tx.try_send(TransportEvent::Down {
                            reason: DownReason::Disconnected,
                        });
                        return None;
                    }
                }
            }
        }

        warn!(
            attempts = self.policy.max_attempts,
            "connect attempts exhausted, realtime updates unavailable"
        );
        let _ = self.event_tx.try_send(TransportEvent::Down {
            reason: DownReason::RetriesExhausted,
        });
        None
    }

    /// Pumps one established connection until it ends, returning why.
    async fn pump(
        &self,
        stream: WsStream,
        out_rx: &mut mpsc::Receiver<ClientEvent>,
    ) -> DownReason {
        let (mut sink, mut source) = stream.split();

        // Personal room first, before any other traffic.
        let join = ClientEvent::JoinUserRoom {
            user_id: self.user_id.clone(),
        };
        if let Ok(frame) = wire::encode(&join)
            && let Err(e) = sink.send(Message::Text(frame.into())).await
        {
            warn!(error = %e, "failed to join user room, dropping connection");
            return DownReason::ConnectionLost;
        }

        let resumed = self.ever_connected.swap(true, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        info!(resumed, url = %self.url, "socket connected");
        if !self.deliver(TransportEvent::Up { resumed }).await {
            return DownReason::Disconnected;
        }

        loop {
            tokio::select! {
                incoming = source.next() => match incoming {
                    Some(Ok(Message::Text(text))) => match wire::decode(text.as_str()) {
                        Ok(event) => {
                            if !self.deliver(TransportEvent::Server(event)).await {
                                return DownReason::Disconnected;
                            }
                        }
                        Err(e) => debug!(error = %e, "ignoring undecodable frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => return DownReason::ConnectionLost,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "socket read error");
                        return DownReason::ConnectionLost;
                    }
                },
                outgoing = out_rx.recv() => match outgoing {
                    Some(event) => match wire::encode(&event) {
                        Ok(frame) => {
                            if let Err(e) = sink.send(Message::Text(frame.into())).await {
                                warn!(error = %e, "socket write failed");
                                return DownReason::ConnectionLost;
                            }
                        }
                        Err(e) => warn!(error = %e, "dropping unencodable outbound event"),
                    },
                    None => return DownReason::Disconnected,
                },
                _ = self.cancel.cancelled() => {
                    let leave = ClientEvent::LeaveUserRoom {
                        user_id: self.user_id.clone(),
                    };
                    if let Ok(frame) = wire::encode(&leave) {
                        let _ = sink.send(Message::Text(frame.into())).await;
                    }
                    let _ = sink.send(Message::Close(None)).await;
                    return DownReason::Disconnected;
                }
            }
        }
    }
}

/// Performs one handshake with the bearer token attached.
async fn establish(url: &str, auth_token: Option<&str>) -> Result<WsStream, VestibuleError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| VestibuleError::Transport {
            message: format!("invalid socket url: {e}"),
            source: Some(Box::new(e)),
        })?;

    if let Some(token) = auth_token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            VestibuleError::Config(format!("invalid auth token header value: {e}"))
        })?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    let (stream, _response) =
        connect_async(request)
            .await
            .map_err(|e| VestibuleError::Transport {
                message: format!("socket connect failed: {e}"),
                source: Some(Box::new(e)),
            })?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::handshake::server::{
        Request as HsRequest, Response as HsResponse,
    };
    use vestibule_core::{ChatId, ServerEvent};

    fn test_policy() -> ReconnectPolicy {
        ReconnectPolicy::new(2, 5, 20)
    }

    fn test_transport(addr: std::net::SocketAddr) -> SocketTransport {
        SocketTransport::new(
            format!("ws://{addr}"),
            Some("test-token"),
            UserId("u1".to_string()),
            test_policy(),
        )
    }

    async fn expect_event(transport: &SocketTransport) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(5), transport.next_event())
            .await
            .expect("timed out waiting for transport event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn emit_before_connect_is_rejected() {
        let transport = SocketTransport::new(
            "ws://127.0.0.1:1",
            None,
            UserId("u1".to_string()),
            test_policy(),
        );
        let err = transport
            .emit(ClientEvent::GetOnlineUsers)
            .await
            .unwrap_err();
        assert!(matches!(err, VestibuleError::NotConnected));
    }

    #[tokio::test]
    async fn exhausted_retry_cycle_reports_down_and_goes_inert() {
        // Nothing listens on port 1, so every attempt is refused.
        let mut transport = SocketTransport::new(
            "ws://127.0.0.1:1",
            None,
            UserId("u1".to_string()),
            test_policy(),
        );
        transport.connect().await.unwrap();

        match expect_event(&transport).await {
            TransportEvent::Down { reason } => {
                assert_eq!(reason, DownReason::RetriesExhausted);
            }
            other => panic!("expected Down, got {other:?}"),
        }
        assert!(!transport.is_connected());
        assert!(matches!(
            transport.emit(ClientEvent::GetOnlineUsers).await,
            Err(VestibuleError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connects_joins_user_room_and_pumps_both_directions() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            // First frame must be the personal room join.
            let first = ws.next().await.unwrap().unwrap().into_text().unwrap();
            let value: serde_json::Value = serde_json::from_str(first.as_str()).unwrap();
            assert_eq!(value["event"], "join_user_room");
            assert_eq!(value["data"]["user_id"], "u1");

            // Push a server event down.
            let presence = serde_json::json!({
                "event": "user_online",
                "data": {"user_id": "u9"}
            });
            ws.send(Message::Text(presence.to_string().into()))
                .await
                .unwrap();

            // Read the client's outbound message, then drop the connection.
            let second = ws.next().await.unwrap().unwrap().into_text().unwrap();
            let value: serde_json::Value = serde_json::from_str(second.as_str()).unwrap();
            assert_eq!(value["event"], "send_message");
            assert_eq!(value["data"]["chat_id"], "c1");
        });

        let mut transport = test_transport(addr);
        transport.connect().await.unwrap();

        match expect_event(&transport).await {
            TransportEvent::Up { resumed } => assert!(!resumed),
            other => panic!("expected Up, got {other:?}"),
        }
        assert!(transport.is_connected());

        match expect_event(&transport).await {
            TransportEvent::Server(ServerEvent::UserOnline { user_id }) => {
                assert_eq!(user_id, UserId("u9".to_string()));
            }
            other => panic!("expected UserOnline, got {other:?}"),
        }

        transport
            .emit(ClientEvent::SendMessage {
                chat_id: ChatId("c1".to_string()),
                text: "hi".to_string(),
                files: vec![],
            })
            .await
            .unwrap();

        server.await.unwrap();
    }

    #[tokio::test]
    async fn handshake_carries_bearer_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (auth_tx, auth_rx) = tokio::sync::oneshot::channel();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |req: &HsRequest, resp: HsResponse| {
                let auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let _ = auth_tx.send(auth);
                Ok(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
                .await
                .unwrap();
            // Drain until the client goes away.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let mut transport = test_transport(addr);
        transport.connect().await.unwrap();

        let auth = auth_rx.await.unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer test-token"));

        transport.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn reconnect_after_drop_reports_resumed_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // Session 1: accept the join, then hang up.
            let (s1, _) = listener.accept().await.unwrap();
            let mut ws1 = accept_async(s1).await.unwrap();
            let _ = ws1.next().await;
            drop(ws1);

            // Session 2: the transport reconnects on its own.
            let (s2, _) = listener.accept().await.unwrap();
            let mut ws2 = accept_async(s2).await.unwrap();
            let first = ws2.next().await.unwrap().unwrap().into_text().unwrap();
            let value: serde_json::Value = serde_json::from_str(first.as_str()).unwrap();
            // Every session re-joins the personal room.
            assert_eq!(value["event"], "join_user_room");
            while let Some(Ok(_)) = ws2.next().await {}
        });

        let mut transport = test_transport(addr);
        transport.connect().await.unwrap();

        match expect_event(&transport).await {
            TransportEvent::Up { resumed } => assert!(!resumed),
            other => panic!("expected first Up, got {other:?}"),
        }
        match expect_event(&transport).await {
            TransportEvent::Down { reason } => assert_eq!(reason, DownReason::ConnectionLost),
            other => panic!("expected Down, got {other:?}"),
        }
        match expect_event(&transport).await {
            TransportEvent::Up { resumed } => assert!(resumed),
            other => panic!("expected resumed Up, got {other:?}"),
        }

        transport.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connect_is_idempotent_while_task_is_live() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let mut transport = test_transport(addr);
        transport.connect().await.unwrap();

        match expect_event(&transport).await {
            TransportEvent::Up { .. } => {}
            other => panic!("expected Up, got {other:?}"),
        }

        // Second connect is a no-op: no second handshake, no second Up.
        transport.connect().await.unwrap();
        let extra = tokio::time::timeout(Duration::from_millis(200), transport.next_event()).await;
        assert!(extra.is_err(), "no further event expected, got {extra:?}");

        transport.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn disconnect_leaves_user_room_and_reports_orderly_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames_tx, frames_rx) = tokio::sync::oneshot::channel();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let mut frames = Vec::new();
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    frames.push(text.as_str().to_string());
                }
            }
            let _ = frames_tx.send(frames);
        });

        let mut transport = test_transport(addr);
        transport.connect().await.unwrap();
        match expect_event(&transport).await {
            TransportEvent::Up { .. } => {}
            other => panic!("expected Up, got {other:?}"),
        }

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());

        match expect_event(&transport).await {
            TransportEvent::Down { reason } => assert_eq!(reason, DownReason::Disconnected),
            other => panic!("expected Down, got {other:?}"),
        }

        let frames = frames_rx.await.unwrap();
        assert_eq!(frames.len(), 2, "expected join + leave, got {frames:?}");
        assert!(frames[0].contains("join_user_room"));
        assert!(frames[1].contains("leave_user_room"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connect_after_exhaustion_starts_a_fresh_cycle() {
        // First cycle: refused. Second cycle: a real server is listening.
        let mut transport = SocketTransport::new(
            "ws://127.0.0.1:1",
            None,
            UserId("u1".to_string()),
            test_policy(),
        );
        transport.connect().await.unwrap();
        match expect_event(&transport).await {
            TransportEvent::Down { reason } => assert_eq!(reason, DownReason::RetriesExhausted),
            other => panic!("expected Down, got {other:?}"),
        }

        // Give the finished io task a moment to wind down, then reconnect.
        tokio::time::sleep(Duration::from_millis(50)).await;
        transport.connect().await.unwrap();
        match expect_event(&transport).await {
            TransportEvent::Down { reason } => assert_eq!(reason, DownReason::RetriesExhausted),
            other => panic!("expected Down from second cycle, got {other:?}"),
        }
    }
}
