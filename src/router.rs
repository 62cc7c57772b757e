//! Event registry and inbound message routing.
//!
//! Listeners subscribe to an [`EventKey`]. Lifecycle events go to their own
//! key; every well-formed inbound [`Frame`] is dispatched in this order:
//!
//! 1. the handler registered for its type via [`MessageRouter::register_handler`]
//! 2. [`EventKey::Message`]
//! 3. [`EventKey::MessageType`] for its type
//! 4. [`EventKey::MessageRegion`] for its region, if it has one
//!
//! Delivery is FIFO within one key. Callbacks run on the connection task and
//! must not block.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::Result;
use crate::types::Frame;
use crate::ws::WsError;

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;
pub type MessageHandler = Arc<dyn Fn(&Frame) + Send + Sync>;

/// Lifecycle and message events emitted by a connection manager.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Event {
    Connected,
    Disconnected {
        /// Why the connection went away
        reason: String,
    },
    /// Debounced, externally visible failure notification
    Error(WsError),
    Reconnecting {
        /// 1-based attempt number within the current cycle
        attempt: u32,
    },
    /// A connection opened by an automatic retry
    Reconnected,
    ReconnectFailed,
    Message(Frame),
}

impl Event {
    /// The lifecycle key this event is published under. Messages are
    /// additionally published under their type and region keys.
    #[must_use]
    pub const fn key(&self) -> EventKey {
        match self {
            Self::Connected => EventKey::Connected,
            Self::Disconnected { .. } => EventKey::Disconnected,
            Self::Error(_) => EventKey::Error,
            Self::Reconnecting { .. } => EventKey::Reconnecting,
            Self::Reconnected => EventKey::Reconnected,
            Self::ReconnectFailed => EventKey::ReconnectFailed,
            Self::Message(_) => EventKey::Message,
        }
    }
}

/// Subscription key for [`Event`]s.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Connected,
    Disconnected,
    Error,
    Reconnecting,
    Reconnected,
    ReconnectFailed,
    /// Every inbound frame
    Message,
    /// Inbound frames of one type
    MessageType(String),
    /// Inbound frames tagged with one region
    MessageRegion(String),
}

impl EventKey {
    #[must_use]
    pub fn message_type<S: Into<String>>(kind: S) -> Self {
        Self::MessageType(kind.into())
    }

    #[must_use]
    pub fn message_region<S: Into<String>>(region: S) -> Self {
        Self::MessageRegion(region.into())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Error => f.write_str("error"),
            Self::Reconnecting => f.write_str("reconnecting"),
            Self::Reconnected => f.write_str("reconnected"),
            Self::ReconnectFailed => f.write_str("reconnect_failed"),
            Self::Message => f.write_str("message"),
            Self::MessageType(kind) => write!(f, "message:{kind}"),
            Self::MessageRegion(region) => write!(f, "message:region:{region}"),
        }
    }
}

/// Handle returned by [`MessageRouter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

#[derive(Default)]
pub struct MessageRouter {
    listeners: DashMap<EventKey, Vec<(ListenerId, Listener)>>,
    handlers: RwLock<Vec<(String, MessageHandler)>>,
}

impl MessageRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `key`. Listeners on one key run in the order
    /// they were added.
    pub fn on<F>(&self, key: EventKey, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(Uuid::now_v7());
        self.listeners
            .entry(key)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            removed |= listeners.len() != before;
            !listeners.is_empty()
        });
        removed
    }

    /// Install the direct handler for frames of `kind`, replacing any previous one.
    pub fn register_handler<S, F>(&self, kind: S, handler: F)
    where
        S: Into<String>,
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        let kind = kind.into();
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.retain(|(existing, _)| *existing != kind);
        handlers.push((kind, Arc::new(handler)));
    }

    /// Remove the direct handler for `kind`. Returns `false` if there was none.
    pub fn unregister_handler(&self, kind: &str) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(existing, _)| existing != kind);
        handlers.len() != before
    }

    /// Notify the listeners of a lifecycle event's key.
    pub fn emit(&self, event: &Event) {
        self.notify(&event.key(), event);
    }

    /// Run the full dispatch sequence for one inbound frame.
    pub fn dispatch(&self, frame: Frame) {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(kind, _)| *kind == frame.kind)
            .map(|(_, handler)| Arc::clone(handler));
        if let Some(handler) = handler {
            handler(&frame);
        }

        let type_key = EventKey::MessageType(frame.kind.clone());
        let region_key = frame.region.clone().map(EventKey::MessageRegion);
        let event = Event::Message(frame);

        self.notify(&EventKey::Message, &event);
        self.notify(&type_key, &event);
        if let Some(region_key) = region_key {
            self.notify(&region_key, &event);
        }
    }

    fn notify(&self, key: &EventKey, event: &Event) {
        // Snapshot so listeners may (un)subscribe without deadlocking the map
        let listeners: Vec<Listener> = match self.listeners.get(key) {
            Some(entry) => entry.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return,
        };
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRouter")
            .field("keys", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Parse one inbound text payload into frames.
///
/// Accepts a single object or an array of objects. Anything else is a
/// protocol error and nothing from the payload is delivered.
pub fn parse_frames(text: &str) -> Result<Vec<Frame>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| WsError::Protocol(format!("payload is not JSON: {e}")))?;

    let frames = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Frame>, _>>(),
        object @ Value::Object(_) => serde_json::from_value(object).map(|frame| vec![frame]),
        other => {
            return Err(WsError::Protocol(format!("expected an object, got {other}")).into());
        }
    };

    frames.map_err(|e| WsError::Protocol(e.to_string()).into())
}
