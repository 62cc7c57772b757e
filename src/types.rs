//! Wire types exchanged over the connection.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_helpers::parse_timestamp;

pub const SYSTEM_TYPE: &str = "system";
pub const HEARTBEAT_TYPE: &str = "heartbeat";
pub const HEARTBEAT_RESPONSE_TYPE: &str = "heartbeat_response";
pub const QUERY_TYPE: &str = "query";

/// One structured message exchanged over the connection.
///
/// Fields not modelled explicitly are kept in [`extra`](Self::extra) and
/// written back out flattened, so caller-defined fields survive a round trip.
/// An inbound `timestamp` that cannot be read as a point in time stays in
/// `extra` under its own key instead of failing the frame.
///
/// ```
/// use resilient_socket::types::Frame;
/// use serde_json::json;
///
/// let frame = Frame::builder()
///     .kind("chat")
///     .region("analysis")
///     .content(json!("hello"))
///     .build();
/// assert_eq!(frame.region.as_deref(), Some("analysis"));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(from = "RawFrame")]
pub struct Frame {
    /// Discriminant used for routing, serialized as `type`
    #[serde(rename = "type")]
    #[builder(into)]
    pub kind: String,
    /// Application-defined routing tag grouping frames by UI panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub region: Option<String>,
    /// Producer of the frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    #[builder(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    #[builder(default)]
    pub extra: Map<String, Value>,
}

/// Inbound shape of a [`Frame`] before the timestamp is interpreted.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawFrame> for Frame {
    fn from(raw: RawFrame) -> Self {
        let mut extra = raw.extra;
        let timestamp = raw.timestamp.and_then(|value| {
            let parsed = parse_timestamp(&value);
            if parsed.is_none() {
                extra.insert("timestamp".to_owned(), value);
            }
            parsed
        });

        Self {
            kind: raw.kind,
            region: raw.region,
            source: raw.source,
            content: raw.content,
            timestamp,
            extra,
        }
    }
}

impl Frame {
    /// Liveness probe sent while connected.
    #[must_use]
    pub fn heartbeat() -> Self {
        Self::builder()
            .kind(HEARTBEAT_TYPE)
            .timestamp(Utc::now())
            .build()
    }

    /// Query frame addressed to the given connection, if any.
    #[must_use]
    pub fn query<Q: Into<String>>(query: Q, connection_id: Option<&str>) -> Self {
        let mut frame = Self::builder()
            .kind(QUERY_TYPE)
            .content(Value::String(query.into()))
            .timestamp(Utc::now())
            .build();
        if let Some(id) = connection_id {
            frame.insert("connection_id", id);
        }
        frame
    }

    /// Set a caller-defined field.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.extra.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Stamp the frame with the current time unless it already carries one.
    pub fn stamp(&mut self) {
        self.timestamp.get_or_insert_with(Utc::now);
    }

    /// Decode the reserved system variants.
    #[must_use]
    pub fn signal(&self) -> Option<SystemSignal> {
        match self.kind.as_str() {
            SYSTEM_TYPE => {
                let connection_id = match self.get("connection_id")? {
                    Value::String(id) => id.clone(),
                    Value::Number(id) => id.to_string(),
                    _ => return None,
                };
                Some(SystemSignal::Identity { connection_id })
            }
            HEARTBEAT_RESPONSE_TYPE => Some(SystemSignal::HeartbeatResponse),
            _ => None,
        }
    }
}

/// Bookkeeping carried by reserved inbound frames.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemSignal {
    /// `{type: "system", connection_id}` assigns the server-side identity.
    /// System frames without a string or numeric id carry no signal.
    Identity { connection_id: String },
    /// `{type: "heartbeat_response"}` acknowledges a heartbeat
    HeartbeatResponse,
}

/// Who this manager is: an optional caller-chosen id plus the id the server
/// assigns once the socket is open.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionIdentity {
    pub client_id: Option<String>,
    pub connection_id: Option<String>,
}
