//! Resilient streaming transport: connect-with-retry, a classifiable
//! close-code policy, and a read loop that feeds frames back to its owner.
//! Reconnects mid-session when the server closes with a retryable code,
//! up to a configurable per-connection attempt cap and connection count.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::config::{matches_any, WsRetryOptions};
use crate::error::LiveError;

/// Mirrors the WebSocket readyState vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ReadyState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ReadyState::Connecting => 0,
            ReadyState::Open => 1,
            ReadyState::Closing => 2,
            ReadyState::Closed => 3,
        }
    }
}

/// Events fired by the transport task, consumed by whoever owns the
/// connection (the [`crate::session::LiveSession`]).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connecting { connection: u32, attempt: u32 },
    Open { connection: u32, attempt: u32 },
    Message(String),
    Close { code: u16, reason: String },
    Error(String),
}

enum Command {
    Send(Message),
    Close(u16, String),
}

/// A single reconnecting WebSocket channel. Owns no business logic beyond
/// connect/retry/read; wire-message interpretation is the caller's job.
pub struct TransportSession {
    ready_state: Arc<AtomicU8>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    events_rx: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    task: tokio::task::JoinHandle<()>,
}

impl TransportSession {
    /// Begin an asynchronous connect to `url` immediately. The retry
    /// policy and open-timeout govern connect attempts; events arrive on
    /// the returned receiver (take it once with [`Self::take_events`]).
    pub fn connect(url: String, retry: WsRetryOptions, open_timeout_secs: f64) -> Self {
        let ready_state = Arc::new(AtomicU8::new(ReadyState::Connecting.as_u8()));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task_ready_state = ready_state.clone();
        let task = tokio::spawn(run(
            url,
            retry,
            open_timeout_secs,
            task_ready_state,
            cmd_rx,
            events_tx,
        ));

        Self {
            ready_state,
            cmd_tx,
            events_rx: Some(events_rx),
            task,
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.ready_state.load(Ordering::Acquire))
    }

    /// Take ownership of the event stream. Returns `None` if already
    /// taken.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<TransportEvent>> {
        self.events_rx.take()
    }

    /// Send a text frame. Fails immediately with [`LiveError::Misuse`]
    /// unless the transport is OPEN.
    pub fn send_text(&self, text: String) -> Result<(), LiveError> {
        if self.ready_state() != ReadyState::Open {
            return Err(LiveError::Misuse("transport is not open".to_string()));
        }
        self.cmd_tx
            .send(Command::Send(Message::Text(text)))
            .map_err(|_| LiveError::Transport("transport task has stopped".to_string()))
    }

    /// Send a binary frame. Fails immediately with [`LiveError::Misuse`]
    /// unless the transport is OPEN.
    pub fn send_binary(&self, data: Vec<u8>) -> Result<(), LiveError> {
        if self.ready_state() != ReadyState::Open {
            return Err(LiveError::Misuse("transport is not open".to_string()));
        }
        self.cmd_tx
            .send(Command::Send(Message::Binary(data)))
            .map_err(|_| LiveError::Transport("transport task has stopped".to_string()))
    }

    /// Idempotent close. Safe to call more than once or while CONNECTING.
    pub fn close(&self, code: u16, reason: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::Close(code, reason.into()));
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    url: String,
    retry: WsRetryOptions,
    open_timeout_secs: f64,
    ready_state: Arc<AtomicU8>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut connection: u32 = 1;

    'connections: loop {
        let mut attempt: u32 = 1;

        let stream = 'attempts: loop {
            let _ = events_tx.send(TransportEvent::Connecting { connection, attempt });

            let connect_fut = tokio_tungstenite::connect_async(&url);
            let timeout_fut = async {
                if open_timeout_secs > 0.0 {
                    tokio::time::sleep(Duration::from_secs_f64(open_timeout_secs)).await;
                } else {
                    std::future::pending::<()>().await;
                }
            };

            let attempt_result = tokio::select! {
                result = connect_fut => result,
                _ = timeout_fut => {
                    log::warn!("transport open timeout on connection {}", connection);
                    set_ready_state(&ready_state, ReadyState::Closed);
                    let _ = events_tx.send(TransportEvent::Close {
                        code: 3008,
                        reason: "WebSocket connection timeout".to_string(),
                    });
                    return;
                }
                (code, reason) = wait_for_close(&mut cmd_rx) => {
                    log::info!("transport close() observed while connecting");
                    set_ready_state(&ready_state, ReadyState::Closed);
                    let _ = events_tx.send(TransportEvent::Close { code, reason });
                    return;
                }
            };

            match attempt_result {
                Ok((stream, _response)) => break 'attempts stream,
                Err(e) => {
                    let unlimited = retry.max_attempts_per_connection == 0;
                    if unlimited || attempt < retry.max_attempts_per_connection {
                        log::warn!(
                            "transport connect attempt {} on connection {} failed: {}",
                            attempt,
                            connection,
                            e
                        );
                        tokio::select! {
                            _ = tokio::time::sleep((retry.delay)(attempt)) => {
                                attempt += 1;
                                continue 'attempts;
                            }
                            (code, reason) = wait_for_close(&mut cmd_rx) => {
                                log::info!("transport close() observed while waiting to retry");
                                set_ready_state(&ready_state, ReadyState::Closed);
                                let _ = events_tx.send(TransportEvent::Close { code, reason });
                                return;
                            }
                        }
                    } else {
                        log::warn!("transport giving up on connection {}: {}", connection, e);
                        let _ = events_tx.send(TransportEvent::Error(e.to_string()));
                        set_ready_state(&ready_state, ReadyState::Closed);
                        let _ = events_tx.send(TransportEvent::Close {
                            code: 1006,
                            reason: "WebSocket connection error".to_string(),
                        });
                        return;
                    }
                }
            }
        };

        set_ready_state(&ready_state, ReadyState::Open);
        let _ = events_tx.send(TransportEvent::Open { connection, attempt });

        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(msg)) => {
                            if let Err(e) = write.send(msg).await {
                                log::warn!("transport send failed: {}", e);
                            }
                        }
                        Some(Command::Close(code, reason)) => {
                            close_now(&ready_state, &mut write, &events_tx, code, reason).await;
                            return;
                        }
                        None => {
                            close_now(&ready_state, &mut write, &events_tx, 1001, "owner dropped".to_string()).await;
                            return;
                        }
                    }
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            let _ = events_tx.send(TransportEvent::Message(text));
                        }
                        Some(Ok(Message::Binary(_))) => {
                            log::debug!("ignoring unexpected inbound binary frame");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = close_frame_parts(frame);
                            if should_reconnect(&retry, connection, code) {
                                log::info!("transport reconnecting after close code {}", code);
                                set_ready_state(&ready_state, ReadyState::Connecting);
                                connection += 1;
                                continue 'connections;
                            }
                            close_now(&ready_state, &mut write, &events_tx, code, reason).await;
                            return;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            log::warn!("transport read error: {}", e);
                            close_now(&ready_state, &mut write, &events_tx, 1006, e.to_string()).await;
                            return;
                        }
                        None => {
                            close_now(&ready_state, &mut write, &events_tx, 1006, "connection dropped".to_string()).await;
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Waits for the next close-worthy command, ignoring `Send` commands (the
/// public API only issues those once the transport is OPEN, but a benign
/// race could still queue one here). Lets `close()` called while the
/// transport is CONNECTING or waiting between retry attempts be observed
/// at the next suspension point instead of only after the current attempt
/// resolves.
async fn wait_for_close(cmd_rx: &mut mpsc::UnboundedReceiver<Command>) -> (u16, String) {
    loop {
        match cmd_rx.recv().await {
            Some(Command::Close(code, reason)) => return (code, reason),
            Some(Command::Send(_)) => continue,
            None => return (1001, "owner dropped".to_string()),
        }
    }
}

fn should_reconnect(retry: &WsRetryOptions, connection: u32, code: u16) -> bool {
    if retry.max_connections > 0 && connection >= retry.max_connections {
        return false;
    }
    matches_any(code as u32, &retry.close_codes)
}

fn close_frame_parts(frame: Option<CloseFrame<'_>>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1005, String::new()),
    }
}

async fn close_now<S>(
    ready_state: &Arc<AtomicU8>,
    write: &mut futures_util::stream::SplitSink<S, Message>,
    events_tx: &mpsc::UnboundedSender<TransportEvent>,
    code: u16,
    reason: String,
) where
    S: futures_util::Sink<Message> + Unpin,
{
    set_ready_state(ready_state, ReadyState::Closing);
    let _ = write
        .send(Message::Close(Some(CloseFrame {
            code: code.into(),
            reason: reason.clone().into(),
        })))
        .await;
    set_ready_state(ready_state, ReadyState::Closed);
    let _ = events_tx.send(TransportEvent::Close { code, reason });
}

fn set_ready_state(ready_state: &Arc<AtomicU8>, state: ReadyState) {
    ready_state.store(state.as_u8(), Ordering::Release);
}
