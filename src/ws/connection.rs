#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::sync::Arc;

use async_stream::try_stream;
use backoff::backoff::Backoff as _;
use futures::Stream;
use futures::future::BoxFuture;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use url::Url;

use super::config::Config;
use super::error::WsError;
use super::traits::{Connection, Connector, TransportEvent};
use crate::Result;
use crate::error::Error;
use crate::heartbeat::{HeartbeatAction, HeartbeatMonitor};
use crate::policy::Attempts;
use crate::reporter::ErrorReporter;
use crate::router::{Event, EventKey, ListenerId, MessageRouter, parse_frames};
use crate::types::{ConnectionIdentity, Frame, SystemSignal};

const CLIENT_DISCONNECT_REASON: &str = "client disconnect";

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Successfully connected
    Connected {
        /// When the connection was established
        since: Instant,
    },
    /// The last attempt or connection failed
    Error,
    /// Waiting out the backoff before the next attempt
    Reconnecting {
        /// Current reconnection attempt number
        attempt: u32,
    },
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

type Reply<T> = oneshot::Sender<std::result::Result<T, WsError>>;

enum Command {
    Connect(Reply<()>),
    Send { text: String, reply: Reply<()> },
    Disconnect(oneshot::Sender<()>),
    Reset(oneshot::Sender<()>),
}

/// Keeps one logical connection alive across network failures, server
/// restarts and idle periods, and fans inbound frames out to subscribers.
///
/// The manager is a cheap handle; all state lives in a background task
/// that serializes commands, socket events and timers, so no two callbacks
/// ever overlap:
/// - at most one socket is open at a time
/// - automatic reconnection with capped exponential backoff
/// - heartbeat frames while connected
/// - listener callbacks and [`Stream`]s for lifecycle and message events
///
/// # Example
///
/// ```rust, no_run
/// use resilient_socket::router::EventKey;
/// use resilient_socket::types::Frame;
/// use resilient_socket::ws::ConnectionManager;
/// use resilient_socket::ws::config::Config;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let connection = ConnectionManager::new("wss://example.com/ws", Config::default())?;
///
///     connection.on(EventKey::message_region("analysis"), |event| {
///         println!("analysis panel: {event:?}");
///     });
///
///     connection.connect().await?;
///     connection
///         .send_message(&Frame::builder().kind("chat").content("hello".into()).build())
///         .await?;
///     connection.disconnect().await;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    identity_rx: watch::Receiver<ConnectionIdentity>,
    router: Arc<MessageRouter>,
    events_tx: broadcast::Sender<Event>,
}

impl ConnectionManager {
    /// Create a manager that opens sockets with `tokio-tungstenite`.
    ///
    /// Nothing is opened until [`connect`](Self::connect) is called.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[cfg(feature = "tungstenite")]
    pub fn new(endpoint: &str, config: Config) -> Result<Self> {
        Self::with_connector(endpoint, config, super::traits::TungsteniteConnector)
    }

    /// Create a manager that opens sockets through `connector`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_connector<C: Connector>(endpoint: &str, config: Config, connector: C) -> Result<Self> {
        Self::with_identity(endpoint, config, None, Arc::new(connector))
    }

    /// Create a manager for a caller-chosen client id.
    ///
    /// The id is sent to the server as the `client_id` query parameter.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime; the connection task is
    /// spawned here.
    pub fn with_identity(
        endpoint: &str,
        config: Config,
        client_id: Option<String>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let endpoint = resolve_endpoint(endpoint, client_id.as_deref())?;

        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (identity_tx, identity_rx) = watch::channel(ConnectionIdentity {
            client_id,
            connection_id: None,
        });
        let router = Arc::new(MessageRouter::new());

        let worker = Worker {
            endpoint,
            connector,
            commands: commands_rx,
            state_tx,
            identity_tx,
            router: Arc::clone(&router),
            events_tx: events_tx.clone(),
            attempts: Attempts::new(config.reconnect.clone().into()),
            heartbeat: HeartbeatMonitor::new(&config.heartbeat),
            reporter: ErrorReporter::new(config.error_debounce),
            config,
            socket: None,
            opening: None,
            retry_at: None,
            waiters: Vec::new(),
            exhausted: false,
        };
        tokio::spawn(worker.run());

        Ok(Self {
            commands,
            state_rx,
            identity_rx,
            router,
            events_tx,
        })
    }

    /// Open the connection.
    ///
    /// Idempotent: resolves immediately when already connected and joins the
    /// pending attempt when one is in flight. Fails on open timeout, on a
    /// close or error before the socket opens, and fast once automatic
    /// reconnection has been exhausted (see [`reset`](Self::reset)).
    pub async fn connect(&self) -> Result<()> {
        Ok(self.request(Command::Connect).await??)
    }

    /// Close the connection and cancel every pending timer.
    ///
    /// When this returns, no further state transition or event happens
    /// until [`connect`](Self::connect) is called again.
    pub async fn disconnect(&self) {
        _ = self.request(Command::Disconnect).await;
    }

    /// Clear a sticky reconnect exhaustion so `connect` and `send_*` work again.
    pub async fn reset(&self) -> Result<()> {
        self.request(Command::Reset).await
    }

    /// Send an application frame.
    ///
    /// If not connected, one `connect` is attempted first. Frames are never
    /// queued for later delivery.
    pub async fn send_message(&self, frame: &Frame) -> Result<()> {
        let mut frame = frame.clone();
        frame.stamp();
        let text = serde_json::to_string(&frame)?;

        if !self.state().is_connected() {
            self.connect().await?;
        }

        Ok(self
            .request(|reply| Command::Send { text, reply })
            .await??)
    }

    /// Send a `query` frame. Without an explicit `connection_id` the one
    /// assigned by the server, if any, is used.
    pub async fn send_query(&self, query: &str, connection_id: Option<&str>) -> Result<()> {
        let assigned = self.connection_id();
        let frame = Frame::query(query, connection_id.or(assigned.as_deref()));
        self.send_message(&frame).await
    }

    /// Install the direct handler for frames of `kind`, replacing any previous one.
    ///
    /// The handler runs before any `message` listener.
    pub fn register_message_handler<S, F>(&self, kind: S, handler: F)
    where
        S: Into<String>,
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.router.register_handler(kind, handler);
    }

    /// Remove the direct handler for `kind`. Returns `false` if there was none.
    pub fn unregister_message_handler(&self, kind: &str) -> bool {
        self.router.unregister_handler(kind)
    }

    /// Subscribe a callback to one event key.
    ///
    /// Callbacks run on the connection task; they must not block.
    pub fn on<F>(&self, key: EventKey, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.router.on(key, listener)
    }

    /// Remove a listener added with [`on`](Self::on). Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.router.off(id)
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// The id assigned by the server for the current connection.
    #[must_use]
    pub fn connection_id(&self) -> Option<String> {
        self.identity_rx.borrow().connection_id.clone()
    }

    /// The caller-chosen client id together with the server-assigned connection id.
    #[must_use]
    pub fn identity(&self) -> ConnectionIdentity {
        self.identity_rx.borrow().clone()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Stream of every lifecycle and message event emitted from now on.
    ///
    /// Ends with [`WsError::Lagged`] if the consumer falls behind by more
    /// than the configured event capacity.
    pub fn events(&self) -> impl Stream<Item = Result<Event>> + use<> {
        let mut rx = self.events_tx.subscribe();

        try_stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(n)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Event stream lagged, missed {n} events");
                        Err(WsError::Lagged { count: n })?;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Stream of inbound frames, optionally restricted to one region.
    pub fn messages(&self, region: Option<&str>) -> impl Stream<Item = Result<Frame>> + use<> {
        let events = self.events();
        let region = region.map(ToOwned::to_owned);

        try_stream! {
            for await event in events {
                if let Event::Message(frame) = event? {
                    if region.is_none() || frame.region == region {
                        yield frame;
                    }
                }
            }
        }
    }

    async fn request<T, F>(&self, command: F) -> Result<T>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command,
    {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .map_err(|_e| WsError::WorkerStopped)?;
        Ok(rx.await.map_err(|_e| WsError::WorkerStopped)?)
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("identity", &*self.identity_rx.borrow())
            .finish_non_exhaustive()
    }
}

fn resolve_endpoint(endpoint: &str, client_id: Option<&str>) -> Result<String> {
    let mut url = Url::parse(endpoint)?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(Error::validation(format!(
            "endpoint scheme must be ws or wss, got {}",
            url.scheme()
        )));
    }
    if let Some(id) = client_id {
        url.query_pairs_mut().append_pair("client_id", id);
    }
    Ok(url.into())
}

/// A socket open in flight.
struct Opening {
    attempt: BoxFuture<'static, Result<Connection>>,
    deadline: Instant,
    /// Started by the backoff timer rather than by a caller
    automatic: bool,
}

enum Step {
    Command(Option<Command>),
    Opened(Result<Connection>),
    OpenTimedOut,
    Socket(TransportEvent),
    Heartbeat,
    Retry,
}

/// Owns the socket and drives the state machine. Runs as one task.
struct Worker {
    endpoint: String,
    config: Config,
    connector: Arc<dyn Connector>,
    commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
    identity_tx: watch::Sender<ConnectionIdentity>,
    router: Arc<MessageRouter>,
    events_tx: broadcast::Sender<Event>,
    attempts: Attempts,
    heartbeat: HeartbeatMonitor,
    reporter: ErrorReporter,
    socket: Option<Connection>,
    opening: Option<Opening>,
    retry_at: Option<Instant>,
    /// Callers of `connect` waiting for the pending attempt
    waiters: Vec<Reply<()>>,
    exhausted: bool,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let open_deadline = self.opening.as_ref().map(|opening| opening.deadline);
            let heartbeat_deadline = self.heartbeat.next_deadline();
            let retry_at = self.retry_at;

            // Commands first: a disconnect queued in the same tick as a timer wins
            let step = tokio::select! {
                biased;

                command = self.commands.recv() => Step::Command(command),
                result = opened(&mut self.opening) => Step::Opened(result),
                () = wait_until(open_deadline) => Step::OpenTimedOut,
                event = next_event(&mut self.socket) => Step::Socket(event),
                () = wait_until(heartbeat_deadline) => Step::Heartbeat,
                () = wait_until(retry_at) => Step::Retry,
            };

            match step {
                Step::Command(None) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(endpoint = %self.endpoint, "All handles dropped, stopping connection task");
                    self.close(None);
                    break;
                }
                Step::Command(Some(command)) => self.handle_command(command),
                Step::Opened(result) => self.on_opened(result),
                Step::OpenTimedOut => self.on_open_timeout(),
                Step::Socket(event) => self.on_socket_event(event),
                Step::Heartbeat => self.on_heartbeat(),
                Step::Retry => self.on_retry(),
            }
        }
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: ConnectionState) {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, from = ?self.state(), to = ?state, "Connection state change");
        self.state_tx.send_replace(state);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(reply) => self.on_connect(reply),
            Command::Send { text, reply } => {
                _ = reply.send(self.send_text(text));
            }
            Command::Disconnect(ack) => {
                self.close(Some(CLIENT_DISCONNECT_REASON));
                _ = ack.send(());
            }
            Command::Reset(ack) => {
                self.exhausted = false;
                self.attempts.reset();
                _ = ack.send(());
            }
        }
    }

    fn on_connect(&mut self, reply: Reply<()>) {
        if self.exhausted {
            _ = reply.send(Err(self.exhausted_error()));
            return;
        }

        match self.state() {
            ConnectionState::Connected { .. } => {
                _ = reply.send(Ok(()));
            }
            _ if self.opening.is_some() => self.waiters.push(reply),
            ConnectionState::Reconnecting { .. } => {
                // Skip the rest of the backoff but stay in the retry cycle
                self.retry_at = None;
                self.waiters.push(reply);
                self.begin_open(true);
            }
            ConnectionState::Disconnected
            | ConnectionState::Error
            | ConnectionState::Connecting => {
                self.waiters.push(reply);
                self.begin_open(false);
            }
        }
    }

    fn send_text(&self, text: String) -> std::result::Result<(), WsError> {
        if self.exhausted {
            return Err(self.exhausted_error());
        }
        match &self.socket {
            Some(socket) if self.state().is_connected() => socket
                .outgoing
                .send(text)
                .map_err(|_e| WsError::ConnectionClosed { reason: None }),
            _ => Err(WsError::NotConnected),
        }
    }

    fn begin_open(&mut self, automatic: bool) {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, automatic, "Opening WebSocket connection");

        let connector = Arc::clone(&self.connector);
        let endpoint = self.endpoint.clone();
        self.opening = Some(Opening {
            attempt: Box::pin(async move { connector.connect(&endpoint).await }),
            deadline: Instant::now() + self.config.open_timeout,
            automatic,
        });
        self.set_state(ConnectionState::Connecting);
    }

    fn on_opened(&mut self, result: Result<Connection>) {
        let Some(opening) = self.opening.take() else {
            return;
        };

        match result {
            Ok(connection) => self.on_open(connection, opening.automatic),
            Err(e) => {
                let error = e
                    .downcast_ref::<WsError>()
                    .cloned()
                    .unwrap_or_else(|| WsError::Transport(e.to_string()));
                self.on_open_failed(error, opening.automatic);
            }
        }
    }

    fn on_open(&mut self, connection: Connection, automatic: bool) {
        let now = Instant::now();
        self.socket = Some(connection);
        self.attempts.reset();
        self.heartbeat.arm(now);
        self.set_state(ConnectionState::Connected { since: now });

        #[cfg(feature = "tracing")]
        tracing::info!(endpoint = %self.endpoint, "WebSocket connected");

        for waiter in self.waiters.drain(..) {
            _ = waiter.send(Ok(()));
        }
        self.publish(Event::Connected);
        if automatic {
            self.publish(Event::Reconnected);
        }
    }

    fn on_open_timeout(&mut self) {
        let Some(opening) = self.opening.take_if(|opening| Instant::now() >= opening.deadline)
        else {
            return;
        };
        // Dropping the attempt cancels it
        let automatic = opening.automatic;
        drop(opening);
        self.on_open_failed(WsError::ConnectionTimeout(self.config.open_timeout), automatic);
    }

    fn on_open_failed(&mut self, error: WsError, automatic: bool) {
        #[cfg(feature = "tracing")]
        tracing::warn!(endpoint = %self.endpoint, automatic, error = %error, "Unable to connect");

        self.set_state(ConnectionState::Error);
        self.reject_waiters(&error);

        // A caller's own connect timing out is only reported to that caller
        if !automatic && matches!(error, WsError::ConnectionTimeout(_)) {
            self.set_state(ConnectionState::Disconnected);
            return;
        }

        self.report(error);
        self.schedule_reconnect();
    }

    fn on_socket_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Text(text) => self.on_text(&text),
            TransportEvent::Closed { reason } => {
                self.on_transport_lost(WsError::ConnectionClosed { reason });
            }
            TransportEvent::Error(e) => self.on_transport_lost(WsError::Transport(e)),
        }
    }

    fn on_text(&mut self, text: &str) {
        #[cfg(feature = "tracing")]
        tracing::trace!(%text, "Received WebSocket text message");

        let frames = match parse_frames(text) {
            Ok(frames) => frames,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%text, error = %e, "Dropping malformed WebSocket frame");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                return;
            }
        };

        for frame in frames {
            match frame.signal() {
                Some(SystemSignal::Identity { connection_id }) => {
                    self.identity_tx
                        .send_modify(|identity| identity.connection_id = Some(connection_id));
                }
                Some(SystemSignal::HeartbeatResponse) => self.heartbeat.acknowledge(),
                None => {}
            }

            if self.events_tx.receiver_count() > 0 {
                _ = self.events_tx.send(Event::Message(frame.clone()));
            }
            self.router.dispatch(frame);
        }
    }

    fn on_transport_lost(&mut self, error: WsError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(endpoint = %self.endpoint, error = %error, "WebSocket connection lost");

        self.socket = None;
        self.heartbeat.disarm();
        self.identity_tx
            .send_modify(|identity| identity.connection_id = None);
        self.set_state(ConnectionState::Error);

        self.publish(Event::Disconnected {
            reason: error.to_string(),
        });
        self.report(error);
        self.schedule_reconnect();
    }

    fn on_heartbeat(&mut self) {
        if !self.state().is_connected() {
            self.heartbeat.disarm();
            return;
        }

        match self.heartbeat.poll(Instant::now()) {
            Some(HeartbeatAction::Beat) => {
                let sent = serde_json::to_string(&Frame::heartbeat())
                    .map_err(|e| WsError::Transport(e.to_string()))
                    .and_then(|text| self.send_text(text));

                #[cfg(feature = "tracing")]
                tracing::trace!(ok = sent.is_ok(), "Sent heartbeat");

                if let Err(e) = sent {
                    self.on_transport_lost(e);
                }
            }
            Some(HeartbeatAction::Expired) => {
                let waited = self.config.heartbeat.response_timeout.unwrap_or_default();
                self.on_transport_lost(WsError::HeartbeatTimeout(waited));
            }
            None => {}
        }
    }

    fn on_retry(&mut self) {
        self.retry_at = None;
        if matches!(self.state(), ConnectionState::Reconnecting { .. }) {
            self.begin_open(true);
        }
    }

    fn schedule_reconnect(&mut self) {
        if let Some(delay) = self.attempts.next_backoff() {
            let attempt = self.attempts.current();

            #[cfg(feature = "tracing")]
            tracing::info!(endpoint = %self.endpoint, attempt, ?delay, "Scheduling reconnection");

            self.retry_at = Some(Instant::now() + delay);
            self.set_state(ConnectionState::Reconnecting { attempt });
            self.publish(Event::Reconnecting { attempt });
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                endpoint = %self.endpoint,
                max_attempts = self.attempts.policy().max_attempts,
                "Reconnection attempts exhausted"
            );

            self.exhausted = true;
            self.retry_at = None;
            self.set_state(ConnectionState::Disconnected);
            let error = self.exhausted_error();
            self.reject_waiters(&error);
            self.publish(Event::ReconnectFailed);
        }
    }

    /// Tear everything down. `reason` is `None` when the task is stopping.
    fn close(&mut self, reason: Option<&str>) {
        self.opening = None;
        self.retry_at = None;
        self.heartbeat.disarm();
        // Dropping the outgoing sender closes the socket
        self.socket = None;
        self.identity_tx
            .send_modify(|identity| identity.connection_id = None);
        self.reject_waiters(&WsError::Disconnected);

        let previous = self.state();
        self.set_state(ConnectionState::Disconnected);
        if let Some(reason) = reason
            && previous != ConnectionState::Disconnected
        {
            self.publish(Event::Disconnected {
                reason: reason.to_owned(),
            });
        }
    }

    fn report(&mut self, error: WsError) {
        if self.reporter.should_report(Instant::now()) {
            self.publish(Event::Error(error));
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %error, "Suppressing repeated error notification");
        }
    }

    fn reject_waiters(&mut self, error: &WsError) {
        for waiter in self.waiters.drain(..) {
            _ = waiter.send(Err(error.clone()));
        }
    }

    fn exhausted_error(&self) -> WsError {
        WsError::ReconnectExhausted {
            attempts: self.attempts.policy().max_attempts,
        }
    }

    fn publish(&self, event: Event) {
        self.router.emit(&event);
        _ = self.events_tx.send(event);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn opened(opening: &mut Option<Opening>) -> Result<Connection> {
    match opening {
        Some(opening) => (&mut opening.attempt).await,
        None => std::future::pending().await,
    }
}

async fn next_event(socket: &mut Option<Connection>) -> TransportEvent {
    match socket {
        Some(socket) => socket
            .incoming
            .recv()
            .await
            .unwrap_or(TransportEvent::Closed { reason: None }),
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_gets_client_id_query() {
        let endpoint = resolve_endpoint("wss://example.com/ws?v=2", Some("user 1")).unwrap();

        assert_eq!(endpoint, "wss://example.com/ws?v=2&client_id=user+1");
    }

    #[test]
    fn endpoint_without_client_id_is_unchanged() {
        let endpoint = resolve_endpoint("ws://127.0.0.1:9000/ws", None).unwrap();

        assert_eq!(endpoint, "ws://127.0.0.1:9000/ws");
    }

    #[test]
    fn non_websocket_endpoints_are_rejected() {
        let error = resolve_endpoint("https://example.com", None).unwrap_err();

        assert_eq!(error.kind(), crate::error::Kind::Validation);
        assert!(resolve_endpoint("not a url", None).is_err());
    }

    #[test]
    fn only_connected_state_is_connected() {
        assert!(
            ConnectionState::Connected {
                since: Instant::now()
            }
            .is_connected()
        );
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Reconnecting { attempt: 1 }.is_connected());
    }
}
