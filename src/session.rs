//! The Live Session: ties the HTTP handshake, transport, send buffer,
//! dispatcher and wire codec together into the one stateful object this
//! crate exists to provide. The public API is a thin async facade over a
//! background task driving the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;

use crate::buffer::SendBuffer;
use crate::config::{self, ClientOptions, ResolvedOptions};
use crate::dispatcher::{EventDispatcher, EventName, ListenerId, SessionEvent};
use crate::error::LiveError;
use crate::http;
use crate::protocol::{self, ClientMessage, InitRequest, InitResponse, WireMessage};
use crate::transport::{TransportEvent, TransportSession};

/// Lifecycle status of a [`LiveSession`]. Transitions are strictly
/// forward; `ended` is terminal and reached at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Starting,
    Started,
    Connecting,
    Connected,
    Ending,
    Ended,
}

struct Inner {
    status: Mutex<SessionStatus>,
    session_id: Mutex<Option<String>>,
    buffer: Mutex<SendBuffer>,
    dispatcher: EventDispatcher,
    transport: Mutex<Option<TransportSession>>,
    cancelled: AtomicBool,
    ended: AtomicBool,
    stopped: AtomicBool,
    options: ResolvedOptions,
    http_client: Client,
}

/// The externally visible session object. Cheap to clone; clones share
/// the same underlying state.
#[derive(Clone)]
pub struct LiveSession {
    inner: Arc<Inner>,
}

impl LiveSession {
    /// Allocate a new session: resolve configuration, POST the init
    /// request, and (on success) open the transport. Returns once the
    /// session reaches `started` or the init sequence has failed and the
    /// terminal `ended` event has already fired.
    pub async fn start(
        mut init_request: InitRequest,
        overrides: ClientOptions,
    ) -> Result<Self, LiveError> {
        let options = config::resolve(overrides)?;
        init_request.messages_config.receive_acknowledgments = Some(true);

        let inner = Arc::new(Inner {
            status: Mutex::new(SessionStatus::Starting),
            session_id: Mutex::new(None),
            buffer: Mutex::new(SendBuffer::new()),
            dispatcher: EventDispatcher::new(),
            transport: Mutex::new(None),
            cancelled: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            options,
            http_client: Client::new(),
        });
        let session = Self { inner };

        let url = format!("{}/v2/live", session.inner.options.api_url.trim_end_matches('/'));
        let response = http::post_json(
            &session.inner.http_client,
            &url,
            &session.inner.options.http_headers,
            &init_request,
            &session.inner.options.http_retry,
            session.inner.options.http_timeout,
        )
        .await;

        let init_response = match response {
            Ok(response) => response.json::<InitResponse>().await.map_err(|e| {
                LiveError::Parse(format!("invalid init response: {}", e))
            }),
            Err(e) => Err(e),
        };

        let init_response = match init_response {
            Ok(r) => r,
            Err(e) => {
                log::error!("session init failed: {}", e);
                session.inner.dispatcher.emit(SessionEvent::Error(e.to_string()));
                session.drive_terminal(1006, Some("Couldn't start a new session".to_string())).await;
                return Err(e);
            }
        };

        *session.inner.session_id.lock().await = Some(init_response.id.clone());
        *session.inner.status.lock().await = SessionStatus::Started;
        session
            .inner
            .dispatcher
            .emit(SessionEvent::Started(init_response.clone()));

        if init_request
            .messages_config
            .receive_lifecycle_events
            .unwrap_or(false)
        {
            let synthetic = WireMessage::StartSession {
                session_id: init_response.id.clone(),
                created_at: init_response.created_at.clone(),
            };
            session
                .inner
                .dispatcher
                .emit(SessionEvent::Message(Box::new(synthetic)));
        }

        session.open_transport(init_response.url).await;

        Ok(session)
    }

    async fn open_transport(&self, url: String) {
        *self.inner.status.lock().await = SessionStatus::Connecting;

        let mut transport = TransportSession::connect(
            url,
            self.inner.options.ws_retry.clone(),
            self.inner.options.ws_timeout,
        );
        let events = transport.take_events().expect("events taken exactly once");
        *self.inner.transport.lock().await = Some(transport);

        let session = self.clone();
        tokio::spawn(async move {
            session.drive_transport_events(events).await;
        });
    }

    async fn drive_transport_events(
        &self,
        mut events: tokio::sync::mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        while let Some(event) = events.recv().await {
            if self.inner.cancelled.load(Ordering::Acquire) {
                break;
            }
            match event {
                TransportEvent::Connecting { connection, attempt } => {
                    self.inner
                        .dispatcher
                        .emit(SessionEvent::Connecting { connection, attempt });
                }
                TransportEvent::Open { connection, attempt } => {
                    *self.inner.status.lock().await = SessionStatus::Connected;
                    self.inner
                        .dispatcher
                        .emit(SessionEvent::Connected { connection, attempt });
                    self.flush_unacknowledged().await;
                }
                TransportEvent::Message(text) => {
                    self.handle_inbound(&text).await;
                }
                TransportEvent::Error(msg) => {
                    self.inner.dispatcher.emit(SessionEvent::Error(msg));
                }
                TransportEvent::Close { code, reason } => {
                    let reason = if reason.is_empty() { None } else { Some(reason) };
                    self.drive_terminal(code, reason).await;
                    break;
                }
            }
        }
    }

    async fn handle_inbound(&self, text: &str) {
        let parsed = protocol::parse_inbound(text);
        let message = match parsed {
            Ok(message) => message,
            Err(e) => {
                log::warn!("dropping unparseable inbound frame: {}", e);
                self.inner.dispatcher.emit(SessionEvent::Error(e.to_string()));
                return;
            }
        };

        if matches!(message, WireMessage::Unknown) {
            log::warn!("dropping inbound frame with unrecognized type");
            self.inner
                .dispatcher
                .emit(SessionEvent::Error("unrecognized message type".to_string()));
            return;
        }

        if let WireMessage::AudioChunk {
            acknowledged: true,
            data: Some(data),
            ..
        } = &message
        {
            self.inner.buffer.lock().await.ack(data.byte_range[1]);
        }

        self.inner
            .dispatcher
            .emit(SessionEvent::Message(Box::new(message)));
    }

    async fn flush_unacknowledged(&self) {
        let payload: Vec<u8> = {
            let buffer = self.inner.buffer.lock().await;
            buffer.unacknowledged().iter().copied().collect()
        };
        if payload.is_empty() {
            return;
        }
        if let Some(transport) = self.inner.transport.lock().await.as_ref() {
            if let Err(e) = transport.send_binary(payload) {
                log::warn!("failed to flush unacknowledged audio: {}", e);
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        *self.inner.status.lock().await
    }

    pub async fn session_id(&self) -> Option<String> {
        self.inner.session_id.lock().await.clone()
    }

    /// Append audio to the send buffer. Non-blocking: calls made before
    /// the transport is OPEN are buffered and sent once it opens. While
    /// OPEN, the *entire* un-acknowledged buffer is re-sent (not just the
    /// new slice), so a reconnect resumes cleanly with no extra
    /// bookkeeping.
    pub async fn send_audio(&self, bytes: &[u8]) {
        if self.inner.stopped.load(Ordering::Acquire) || self.inner.ended.load(Ordering::Acquire) {
            return;
        }
        self.inner.buffer.lock().await.append(bytes);
        self.flush_unacknowledged().await;
    }

    /// Half-close: emit `ending`, send the `stop_recording` control frame,
    /// and stop accepting further audio. No-op if already ending/ended.
    pub async fn stop_recording(&self) {
        if self.inner.stopped.swap(true, Ordering::AcqRel) || self.inner.ended.load(Ordering::Acquire) {
            return;
        }
        *self.inner.status.lock().await = SessionStatus::Ending;
        self.inner.dispatcher.emit(SessionEvent::Ending { code: 1000, reason: None });

        if let Some(transport) = self.inner.transport.lock().await.as_ref() {
            let frame = serde_json::to_string(&ClientMessage::StopRecording)
                .expect("ClientMessage always serializes");
            if let Err(e) = transport.send_text(frame) {
                log::warn!("failed to send stop_recording: {}", e);
            }
        }
    }

    /// Hard close: unconditional terminal sequence. Idempotent; `ended`
    /// fires at most once regardless of how many times this is called.
    pub async fn end_session(&self) {
        self.drive_terminal(1001, Some("Session ended by user".to_string()))
            .await;
    }

    async fn drive_terminal(&self, code: u16, reason: Option<String>) {
        if self.inner.ended.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.cancelled.store(true, Ordering::Release);

        if *self.inner.status.lock().await != SessionStatus::Ending {
            *self.inner.status.lock().await = SessionStatus::Ending;
            self.inner.dispatcher.emit(SessionEvent::Ending {
                code,
                reason: reason.clone(),
            });
        }

        *self.inner.status.lock().await = SessionStatus::Ended;
        self.inner
            .dispatcher
            .emit(SessionEvent::Ended { code, reason: reason.clone() });

        if let Some(transport) = self.inner.transport.lock().await.as_ref() {
            transport.close(code, reason.unwrap_or_default());
        }

        self.inner.buffer.lock().await.clear();
        self.inner.dispatcher.remove_all(None);
    }

    pub fn on<F>(&self, name: EventName, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner.dispatcher.on(name, callback)
    }

    pub fn once<F>(&self, name: EventName, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner.dispatcher.once(name, callback)
    }

    pub fn off(&self, id: ListenerId) {
        self.inner.dispatcher.off(id);
    }

    pub fn remove_all(&self, name: Option<EventName>) {
        self.inner.dispatcher.remove_all(name);
    }
}
