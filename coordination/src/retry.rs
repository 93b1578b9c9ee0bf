//! Retry policy for oracle calls.
//!
//! Transient failures back off `base * 2^attempt`; rate limits back off one
//! step further, `base * 2^(attempt + 1)`. Both are capped at `max_delay_ms`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff schedule for one oracle invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Backoff multiplier (2.0 for exponential).
    pub multiplier: f64,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Delay after a transient failure on `attempt` (0-indexed).
    pub fn transient_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.scaled(attempt))
    }

    /// Delay after a rate limit on `attempt` (0-indexed).
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.scaled(attempt.saturating_add(1)))
    }

    /// Whether `attempt` (0-indexed) is the final one.
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }

    /// Policy with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn scaled(&self, exponent: u32) -> u64 {
        let delay = self.base_delay_ms as f64 * self.multiplier.powi(exponent.min(64) as i32);
        if !delay.is_finite() || delay >= self.max_delay_ms as f64 {
            return self.max_delay_ms;
        }
        delay as u64
    }
}

impl Default for RetryPolicy {
    /// Default: 3 attempts, 1s base, 2x multiplier, 30s max.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}
