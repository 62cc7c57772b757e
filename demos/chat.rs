//! Connects to a WebSocket endpoint, prints every lifecycle event and
//! inbound frame, and sends a query once connected.
//!
//! Run with tracing enabled:
//! ```sh
//! RESILIENT_SOCKET_ENDPOINT=ws://127.0.0.1:8000/ws RUST_LOG=debug cargo run --example chat
//! ```

use std::time::Duration;

use futures::StreamExt as _;
use resilient_socket::router::{Event, EventKey};
use resilient_socket::ws::ConnectionManager;
use resilient_socket::ws::config::Config;
use tokio::time::timeout;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ENDPOINT_VAR: &str = "RESILIENT_SOCKET_ENDPOINT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let endpoint = std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| "ws://127.0.0.1:8000/ws".to_owned());
    let connection = ConnectionManager::new(&endpoint, Config::default())?;

    connection.on(EventKey::Reconnecting, |event| {
        if let Event::Reconnecting { attempt } = event {
            warn!(attempt, "reconnecting");
        }
    });
    connection.register_message_handler("system", |frame| {
        info!(connection_id = ?frame.get("connection_id"), "identity assigned");
    });

    let mut events = Box::pin(connection.events());
    connection.connect().await?;
    connection.send_query("summarize the last report", None).await?;

    while let Ok(Some(event)) = timeout(Duration::from_secs(30), events.next()).await {
        match event? {
            Event::Message(frame) => info!(kind = %frame.kind, region = ?frame.region, content = %frame.content),
            other => info!(event = ?other),
        }
    }

    connection.disconnect().await;
    Ok(())
}
