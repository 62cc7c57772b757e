#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use bon::Builder;

const DEFAULT_OPEN_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_ERROR_DEBOUNCE_DURATION: Duration = Duration::from_secs(5);
const DEFAULT_HEARTBEAT_INTERVAL_DURATION: Duration = Duration::from_secs(60);
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY_DURATION: Duration = Duration::from_secs(2);
const DEFAULT_CAP_DELAY_DURATION: Duration = Duration::from_secs(30);
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;
/// Broadcast channel capacity for lifecycle and message events.
const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for connection manager behavior.
///
/// ```
/// use std::time::Duration;
///
/// use resilient_socket::ws::config::{Config, ReconnectConfig};
///
/// let config = Config::builder()
///     .open_timeout(Duration::from_secs(3))
///     .reconnect(ReconnectConfig::builder().max_attempts(10).build())
///     .build();
/// assert_eq!(config.reconnect.max_attempts, 10);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Upper bound on the time spent in `Connecting` before the attempt fails
    #[builder(default = DEFAULT_OPEN_TIMEOUT_DURATION)]
    pub open_timeout: Duration,
    /// Minimum spacing between two externally visible error notifications
    #[builder(default = DEFAULT_ERROR_DEBOUNCE_DURATION)]
    pub error_debounce: Duration,
    /// Liveness probe configuration
    #[builder(default)]
    pub heartbeat: HeartbeatConfig,
    /// Reconnection strategy configuration
    #[builder(default)]
    pub reconnect: ReconnectConfig,
    /// Capacity of the event broadcast channel backing [`events`](crate::ws::ConnectionManager::events)
    #[builder(default = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration for the heartbeat sent while connected.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct HeartbeatConfig {
    /// Interval between two `heartbeat` frames
    #[builder(default = DEFAULT_HEARTBEAT_INTERVAL_DURATION)]
    pub interval: Duration,
    /// How long to wait for a `heartbeat_response` before forcing a reconnect.
    /// `None` never waits: liveness loss is then only detected by the transport.
    pub response_timeout: Option<Duration>,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration for automatic reconnection behavior.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ReconnectConfig {
    /// Maximum number of automatic reconnection attempts before giving up
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Delay before the first reconnection attempt
    #[builder(default = DEFAULT_BASE_DELAY_DURATION)]
    pub base_delay: Duration,
    /// Upper bound for any single delay
    #[builder(default = DEFAULT_CAP_DELAY_DURATION)]
    pub cap_delay: Duration,
    /// Multiplier applied per attempt
    #[builder(default = DEFAULT_BACKOFF_MULTIPLIER)]
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
