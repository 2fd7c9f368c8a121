//! Error taxonomy for the Live Session SDK
//!
//! One variant per failure category described by the session's error design:
//! configuration, HTTP, timeout, transport, parse and misuse errors. Mirrors
//! the hand-rolled `Display`/`Error` style the rest of this crate's
//! predecessor used for `StreamingError`/`TranscriptionError` rather than
//! pulling in a derive macro.

use std::collections::HashMap;
use std::fmt;

/// Errors surfaced by a [`crate::session::LiveSession`].
#[derive(Debug, Clone)]
pub enum LiveError {
    /// Invalid client configuration caught at construction time (bad URL
    /// scheme, missing API key on the managed host).
    Configuration(String),

    /// A non-2xx response from the session-allocation HTTP call.
    Http {
        method: String,
        url: String,
        status: u16,
        body: Option<String>,
        headers: HashMap<String, String>,
        request_id: Option<String>,
    },

    /// Init POST or WebSocket handshake exceeded its configured timeout.
    Timeout { context: String, timeout_secs: f64 },

    /// A non-retryable close or read failure on the transport.
    Transport(String),

    /// A malformed or unrecognized inbound frame. Non-fatal: the frame is
    /// dropped and the session continues.
    Parse(String),

    /// Caller misuse: sending on a transport that is not open, or pushing
    /// audio after the session has started ending.
    Misuse(String),
}

impl fmt::Display for LiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveError::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
            LiveError::Http {
                method,
                url,
                status,
                body,
                request_id,
                ..
            } => {
                write!(f, "HTTP error: {} {} -> {}", method, url, status)?;
                if let Some(id) = request_id {
                    write!(f, " (request-id: {})", id)?;
                }
                if let Some(body) = body {
                    write!(f, ": {}", body)?;
                }
                Ok(())
            }
            LiveError::Timeout {
                context,
                timeout_secs,
            } => write!(f, "{} timed out after {}s", context, timeout_secs),
            LiveError::Transport(msg) => write!(f, "transport error: {}", msg),
            LiveError::Parse(msg) => write!(f, "failed to parse inbound frame: {}", msg),
            LiveError::Misuse(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LiveError {}
