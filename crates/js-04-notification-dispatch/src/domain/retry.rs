//! Bounded exponential backoff.

use rand::Rng;
use std::time::Duration;

/// Attempts per delivery, first try included.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Add up to 10% random delay so retries of one outage spread out.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempts` have failed.
    pub fn allows_retry(&self, attempts: u8) -> bool {
        attempts < self.max_attempts
    }

    /// Pause before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u8) -> Duration {
        let exponent = u32::from(attempt.saturating_sub(1)).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let spread = delay.as_millis() as u64 / 10;
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
    }
}
