//! Core WebSocket infrastructure.
//!
//! This module provides the long-lived connection manager and the transport
//! seam it runs on.
//!
//! # Architecture
//!
//! - [`ConnectionManager`]: handle to one logical connection, with heartbeat and reconnection
//! - [`Connector`]: trait for opening physical sockets
//! - [`config`]: tunables for timeouts, heartbeat and backoff
//!
//! # Example
//!
//! ```ignore
//! let connection = ConnectionManager::with_connector(endpoint, Config::default(), MyConnector)?;
//! let mut events = Box::pin(connection.events());
//! connection.connect().await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod traits;

pub use connection::{ConnectionManager, ConnectionState};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use traits::*;
