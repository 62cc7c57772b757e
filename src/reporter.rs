//! Debouncing of error notifications on a flapping link.

use std::time::Duration;

use tokio::time::Instant;

/// Debounces externally visible error notifications.
///
/// Only the notification is suppressed; callers still run their recovery
/// path for every error.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    window: Duration,
    last_reported: Option<Instant>,
}

impl ErrorReporter {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_reported: None,
        }
    }

    /// Returns `true` if an error observed at `now` should be surfaced.
    pub fn should_report(&mut self, now: Instant) -> bool {
        match self.last_reported {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last_reported = Some(now);
                true
            }
        }
    }
}
