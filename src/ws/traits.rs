//! Transport seam between the connection state machine and a physical socket.
//!
//! A [`Connector`] opens one socket per call and hands back a [`Connection`]:
//! a pair of channels the connection worker can `select!` on without owning
//! any socket I/O itself. Tests substitute an in-memory connector.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::Result;

/// Something that happened on an open socket.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame from the peer
    Text(String),
    /// The peer or the network closed the socket
    Closed {
        /// Close reason given by the peer, if any
        reason: Option<String>,
    },
    /// The socket failed; no further events follow
    Error(String),
}

/// One open socket, expressed as channels.
///
/// Dropping [`outgoing`](Self::outgoing) closes the socket.
#[non_exhaustive]
#[derive(Debug)]
pub struct Connection {
    /// Text frames to write to the peer
    pub outgoing: mpsc::UnboundedSender<String>,
    /// Events read from the peer
    pub incoming: mpsc::UnboundedReceiver<TransportEvent>,
}

impl Connection {
    #[must_use]
    pub const fn new(
        outgoing: mpsc::UnboundedSender<String>,
        incoming: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self { outgoing, incoming }
    }
}

/// Opens physical sockets.
///
/// # Example
///
/// ```ignore
/// struct Loopback;
///
/// #[async_trait]
/// impl Connector for Loopback {
///     async fn connect(&self, _endpoint: &str) -> Result<Connection> {
///         let (outgoing, _peer_rx) = mpsc::unbounded_channel();
///         let (_peer_tx, incoming) = mpsc::unbounded_channel();
///         Ok(Connection::new(outgoing, incoming))
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a socket to `endpoint`. Resolves once the socket is open.
    async fn connect(&self, endpoint: &str) -> Result<Connection>;
}

#[cfg(feature = "tungstenite")]
pub use tungstenite::TungsteniteConnector;

#[cfg(feature = "tungstenite")]
mod tungstenite {
    use futures::{SinkExt as _, StreamExt as _};
    use tokio::sync::mpsc;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    use super::{Connection, Connector, TransportEvent};
    use crate::Result;

    /// [`Connector`] backed by `tokio-tungstenite`.
    ///
    /// Each connection spawns one pump task that forwards text frames in
    /// both directions and sends a Close frame once the outgoing sender is
    /// dropped.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TungsteniteConnector;

    #[async_trait::async_trait]
    impl Connector for TungsteniteConnector {
        async fn connect(&self, endpoint: &str) -> Result<Connection> {
            let (ws_stream, _) = connect_async(endpoint).await?;
            let (mut write, mut read) = ws_stream.split();

            let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
            let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        msg = read.next() => {
                            let event = match msg {
                                Some(Ok(Message::Text(text))) => TransportEvent::Text(text.to_string()),
                                Some(Ok(Message::Close(frame))) => TransportEvent::Closed {
                                    reason: frame
                                        .map(|f| f.reason.to_string())
                                        .filter(|reason| !reason.is_empty()),
                                },
                                Some(Ok(_)) => {
                                    // Binary frames and protocol-level ping/pong are not ours
                                    continue;
                                }
                                Some(Err(e)) => TransportEvent::Error(e.to_string()),
                                None => TransportEvent::Closed { reason: None },
                            };
                            let terminal = !matches!(event, TransportEvent::Text(_));
                            if incoming_tx.send(event).is_err() || terminal {
                                break;
                            }
                        }

                        outgoing = outgoing_rx.recv() => {
                            let Some(text) = outgoing else {
                                // Owner dropped the connection
                                _ = write.send(Message::Close(None)).await;
                                break;
                            };
                            if let Err(e) = write.send(Message::Text(text.into())).await {
                                _ = incoming_tx.send(TransportEvent::Error(e.to_string()));
                                break;
                            }
                        }
                    }
                }
            });

            Ok(Connection::new(outgoing_tx, incoming_rx))
        }
    }
}
