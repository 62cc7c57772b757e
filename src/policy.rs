//! Reconnection backoff policy.
//!
//! [`ReconnectPolicy`] is a pure mapping from attempt number to delay.
//! [`Attempts`] is the per-cycle attempt counter that walks the policy and
//! plugs into the [`backoff`] crate's [`Backoff`] trait.

use std::time::Duration;

use backoff::backoff::Backoff;

use crate::ws::config::ReconnectConfig;

/// Deterministic exponential backoff without jitter.
///
/// `delay(attempt) = min(cap_delay, base_delay * multiplier^(attempt - 1))`
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub cap_delay: Duration,
    pub multiplier: f64,
}

impl ReconnectPolicy {
    /// Delay to wait before `attempt` (1-based). Attempt `0` is treated as `1`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Exponential growth is computed in seconds as f64"
    )]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);

        // Overflow to infinity lands on the cap
        Duration::try_from_secs_f64(self.base_delay.as_secs_f64() * factor)
            .unwrap_or(self.cap_delay)
            .min(self.cap_delay)
    }

    /// Whether `attempt` is past the configured maximum.
    #[must_use]
    pub const fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectConfig::default().into()
    }
}

impl From<ReconnectConfig> for ReconnectPolicy {
    fn from(config: ReconnectConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: config.base_delay,
            cap_delay: config.cap_delay,
            // A shrinking (or NaN) multiplier would break monotonicity
            multiplier: config.multiplier.max(1.0),
        }
    }
}

/// Attempt counter for one reconnection cycle.
#[derive(Debug, Clone)]
pub struct Attempts {
    policy: ReconnectPolicy,
    current: u32,
}

impl Attempts {
    #[must_use]
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, current: 0 }
    }

    /// Number of attempts made in the current cycle.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}

impl Backoff for Attempts {
    fn reset(&mut self) {
        self.current = 0;
    }

    /// Advances the counter and returns the delay for the new attempt, or
    /// `None` once the policy is exhausted.
    fn next_backoff(&mut self) -> Option<Duration> {
        self.current = self.current.saturating_add(1);
        if self.policy.is_exhausted(self.current) {
            None
        } else {
            Some(self.policy.delay(self.current))
        }
    }
}
