//! Realtime transport: STOMP frames over a WebSocket.

pub mod client;
pub mod guard;
pub mod policy;
pub mod stomp;

pub use client::{parse_group_payload, publish_groups, watch_groups, StompSession};
pub use guard::{DeliveryGuard, DEFAULT_GUARD_CAPACITY};
pub use policy::{ReconnectPolicy, DEFAULT_RETRY_DELAY};
pub use stomp::StompFrame;

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("connection closed")]
    Closed,

    #[error("{what} gave up after {attempts} attempt(s): {last_error}")]
    AttemptsExhausted {
        what: String,
        attempts: u32,
        last_error: String,
    },
}
