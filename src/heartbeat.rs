//! Heartbeat bookkeeping for an open connection.
//!
//! The monitor performs no I/O. The connection worker asks it for the next
//! deadline, sleeps until then, and calls [`HeartbeatMonitor::poll`] to learn
//! whether a heartbeat frame is due or the peer stopped answering.

use std::time::Duration;

use tokio::time::Instant;

use crate::ws::config::HeartbeatConfig;

/// What the worker should do when a heartbeat deadline fires.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Send a `heartbeat` frame
    Beat,
    /// No `heartbeat_response` arrived in time; the connection is considered dead
    Expired,
}

#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    interval: Duration,
    response_timeout: Option<Duration>,
    next_beat: Option<Instant>,
    /// Time of the oldest heartbeat still waiting for a response
    unanswered_since: Option<Instant>,
}

impl HeartbeatMonitor {
    #[must_use]
    pub fn new(config: &HeartbeatConfig) -> Self {
        Self {
            interval: config.interval,
            response_timeout: config.response_timeout,
            next_beat: None,
            unanswered_since: None,
        }
    }

    /// Start beating; the first heartbeat is due one interval from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.next_beat = Some(now + self.interval);
        self.unanswered_since = None;
    }

    pub fn disarm(&mut self) {
        self.next_beat = None;
        self.unanswered_since = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.next_beat.is_some()
    }

    /// Earliest instant at which [`poll`](Self::poll) has something to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let next_beat = self.next_beat?;
        match self.response_deadline() {
            Some(expiry) => Some(next_beat.min(expiry)),
            None => Some(next_beat),
        }
    }

    /// Advance the monitor to `now`.
    ///
    /// Beats re-arm unconditionally; only a configured response timeout can
    /// turn a missing answer into [`HeartbeatAction::Expired`], which also
    /// disarms the monitor.
    pub fn poll(&mut self, now: Instant) -> Option<HeartbeatAction> {
        if let Some(expiry) = self.response_deadline()
            && now >= expiry
        {
            self.disarm();
            return Some(HeartbeatAction::Expired);
        }

        let next_beat = self.next_beat?;
        if now < next_beat {
            return None;
        }

        self.next_beat = Some(now + self.interval);
        if self.response_timeout.is_some() && self.unanswered_since.is_none() {
            self.unanswered_since = Some(now);
        }
        Some(HeartbeatAction::Beat)
    }

    /// Record a `heartbeat_response` from the peer.
    pub fn acknowledge(&mut self) {
        self.unanswered_since = None;
    }

    fn response_deadline(&self) -> Option<Instant> {
        Some(self.unanswered_since? + self.response_timeout?)
    }
}
