#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::error::Kind;

/// Connection-level error variants.
///
/// Unlike [`crate::error::Error`] these are `Clone`, so one failure can be
/// handed to every pending `connect()` caller and to the event stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsError {
    /// Opening the socket took longer than the configured timeout
    ConnectionTimeout(Duration),
    /// Error reported by the underlying socket
    Transport(String),
    /// The socket was closed by the peer or the network
    ConnectionClosed {
        /// Close reason given by the peer, if any
        reason: Option<String>,
    },
    /// The manager was explicitly disconnected while the operation was pending
    Disconnected,
    /// Operation requires an open connection
    NotConnected,
    /// Received a frame that could not be parsed
    Protocol(String),
    /// No `heartbeat_response` arrived within the configured deadline
    HeartbeatTimeout(Duration),
    /// Automatic reconnection gave up
    ReconnectExhausted {
        /// Number of attempts made in the failed cycle
        attempts: u32,
    },
    /// The background connection task is gone
    WorkerStopped,
    /// Event stream lagged and missed events
    Lagged {
        /// Number of events that were missed
        count: u64,
    },
}

impl WsError {
    /// Returns the crate-level error kind this variant maps to.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::ConnectionTimeout(_) => Kind::Timeout,
            Self::Protocol(_) => Kind::Protocol,
            Self::ReconnectExhausted { .. } => Kind::ReconnectExhausted,
            Self::Lagged { .. } | Self::WorkerStopped => Kind::Internal,
            Self::Transport(_)
            | Self::ConnectionClosed { .. }
            | Self::Disconnected
            | Self::NotConnected
            | Self::HeartbeatTimeout(_) => Kind::Transport,
        }
    }
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionTimeout(after) => {
                write!(f, "WebSocket connection timed out after {after:?}")
            }
            Self::Transport(e) => write!(f, "WebSocket transport error: {e}"),
            Self::ConnectionClosed { reason: Some(reason) } => {
                write!(f, "WebSocket connection closed: {reason}")
            }
            Self::ConnectionClosed { reason: None } => write!(f, "WebSocket connection closed"),
            Self::Disconnected => write!(f, "WebSocket was disconnected by the client"),
            Self::NotConnected => write!(f, "WebSocket is not connected"),
            Self::Protocol(msg) => write!(f, "Invalid WebSocket frame: {msg}"),
            Self::HeartbeatTimeout(after) => {
                write!(f, "No heartbeat response received within {after:?}")
            }
            Self::ReconnectExhausted { attempts } => {
                write!(f, "Reconnection gave up after {attempts} attempts")
            }
            Self::WorkerStopped => write!(f, "WebSocket connection task has stopped"),
            Self::Lagged { count } => write!(f, "Event stream lagged, missed {count} events"),
        }
    }
}

impl StdError for WsError {}
