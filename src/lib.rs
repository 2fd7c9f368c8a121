//! Client SDK for a real-time speech transcription service.
//!
//! The [`session::LiveSession`] is the crate's reason for existing: it
//! coordinates a one-shot HTTP handshake, a resilient WebSocket-style
//! streaming transport with automatic reconnection and resumable audio,
//! an audio send-buffer with byte-range acknowledgement semantics, a
//! session state machine, and a typed event-dispatch surface. Everything
//! else in this crate is plumbing in service of that object.

// LiveError carries request/response detail (headers, body, request id) for
// diagnosability; boxing it would touch every call site for a few dozen
// bytes of Result size.
#![allow(clippy::result_large_err)]

pub mod buffer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::ClientOptions;
pub use dispatcher::{EventName, ListenerId, SessionEvent};
pub use error::LiveError;
pub use protocol::{InitRequest, InitResponse, WireMessage};
pub use session::{LiveSession, SessionStatus};
