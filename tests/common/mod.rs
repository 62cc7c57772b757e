#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests"
)]
#![allow(
    unused,
    reason = "Each test binary uses a different subset of these helpers"
)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use resilient_socket::Result;
use resilient_socket::router::{Event, EventKey};
use resilient_socket::ws::config::{Config, HeartbeatConfig, ReconnectConfig};
use resilient_socket::ws::{Connection, ConnectionManager, Connector, TransportEvent, WsError};
use serde_json::Value;
use tokio::sync::mpsc;

pub const ENDPOINT: &str = "ws://fake.test/ws";

/// How the fake connector answers one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Accept,
    Refuse,
    /// Never resolves; only the open timeout ends the attempt
    Hang,
}

/// Server side of one accepted fake socket.
pub struct Peer {
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl Peer {
    pub fn send(&self, text: &str) {
        drop(self.to_client.send(TransportEvent::Text(text.to_owned())));
    }

    pub fn send_json(&self, value: &Value) {
        self.send(&value.to_string());
    }

    pub fn close(&self) {
        drop(self.to_client.send(TransportEvent::Closed {
            reason: Some("server restart".to_owned()),
        }));
    }

    pub fn fail(&self) {
        drop(self.to_client.send(TransportEvent::Error("connection reset".to_owned())));
    }

    /// Everything the client has written so far, parsed as JSON.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(text) = self.from_client.try_recv() {
            frames.push(serde_json::from_str(&text).unwrap());
        }
        frames
    }

    /// Whether the client has dropped its end of the socket.
    pub fn is_closed_by_client(&mut self) -> bool {
        matches!(
            self.from_client.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        )
    }
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Behavior>,
    fallback: Option<Behavior>,
    attempts: usize,
    peers: VecDeque<Peer>,
    opened: usize,
}

/// In-memory [`Connector`] whose answers are scripted by the test.
#[derive(Clone, Default)]
pub struct FakeConnector {
    inner: Arc<Mutex<Inner>>,
}

impl FakeConnector {
    /// Answer every attempt with `behavior`.
    pub fn always(behavior: Behavior) -> Self {
        let connector = Self::default();
        connector.inner.lock().unwrap().fallback = Some(behavior);
        connector
    }

    /// Answer the next attempts with `script`, then fall back to `then`.
    pub fn scripted<I: IntoIterator<Item = Behavior>>(script: I, then: Behavior) -> Self {
        let connector = Self::always(then);
        connector.inner.lock().unwrap().script = script.into_iter().collect();
        connector
    }

    pub fn set_fallback(&self, behavior: Behavior) {
        self.inner.lock().unwrap().fallback = Some(behavior);
    }

    /// Number of connection attempts seen.
    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts
    }

    /// Number of sockets actually opened.
    pub fn opened(&self) -> usize {
        self.inner.lock().unwrap().opened
    }

    /// Server side of the oldest accepted socket not yet taken.
    pub fn take_peer(&self) -> Peer {
        self.inner
            .lock()
            .unwrap()
            .peers
            .pop_front()
            .expect("no accepted socket to take")
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _endpoint: &str) -> Result<Connection> {
        let behavior = {
            let mut inner = self.inner.lock().unwrap();
            inner.attempts += 1;
            inner
                .script
                .pop_front()
                .or(inner.fallback)
                .unwrap_or(Behavior::Accept)
        };

        match behavior {
            Behavior::Accept => {
                let (outgoing, from_client) = mpsc::unbounded_channel();
                let (to_client, incoming) = mpsc::unbounded_channel();
                let mut inner = self.inner.lock().unwrap();
                inner.opened += 1;
                inner.peers.push_back(Peer {
                    to_client,
                    from_client,
                });
                Ok(Connection::new(outgoing, incoming))
            }
            Behavior::Refuse => Err(WsError::Transport("connection refused".to_owned()).into()),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

/// Records lifecycle events as short labels, e.g. `reconnecting(2)`.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn attach(connection: &ConnectionManager) -> Self {
        let log = Self::default();
        for key in [
            EventKey::Connected,
            EventKey::Disconnected,
            EventKey::Error,
            EventKey::Reconnecting,
            EventKey::Reconnected,
            EventKey::ReconnectFailed,
        ] {
            let entries = Arc::clone(&log.entries);
            connection.on(key, move |event| entries.lock().unwrap().push(label(event)));
        }
        log
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries().iter().filter(|entry| *entry == label).count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

fn label(event: &Event) -> String {
    match event {
        Event::Connected => "connected".to_owned(),
        Event::Disconnected { .. } => "disconnected".to_owned(),
        Event::Error(_) => "error".to_owned(),
        Event::Reconnecting { attempt } => format!("reconnecting({attempt})"),
        Event::Reconnected => "reconnected".to_owned(),
        Event::ReconnectFailed => "reconnect_failed".to_owned(),
        Event::Message(frame) => format!("message({})", frame.kind),
        _ => "other".to_owned(),
    }
}

/// Config with short, round backoff values.
pub fn config(max_attempts: u32, base_delay_ms: u64) -> Config {
    Config::builder()
        .reconnect(
            ReconnectConfig::builder()
                .max_attempts(max_attempts)
                .base_delay(Duration::from_millis(base_delay_ms))
                .multiplier(1.0)
                .build(),
        )
        .build()
}

pub fn config_with_heartbeat(interval: Duration, response_timeout: Option<Duration>) -> Config {
    Config::builder()
        .heartbeat(
            HeartbeatConfig::builder()
                .interval(interval)
                .maybe_response_timeout(response_timeout)
                .build(),
        )
        .reconnect(
            ReconnectConfig::builder()
                .base_delay(Duration::from_millis(100))
                .build(),
        )
        .build()
}

pub fn manager(connector: &FakeConnector, config: Config) -> ConnectionManager {
    ConnectionManager::with_connector(ENDPOINT, config, connector.clone()).unwrap()
}

/// Let the connection task drain everything that is ready.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
