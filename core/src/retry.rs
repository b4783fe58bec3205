//! Attempt budget and linear backoff for reads.

use std::time::Duration;

use crate::error::ApiError;

/// Which failures a read is retried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryMode {
    /// Every failure is retried, deterministic ones included.
    #[default]
    Always,
    /// Only resets, timeouts, other transport failures and 5xx answers.
    TransientOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub mode: RetryMode,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            mode: RetryMode::Always,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given 1-based attempt failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Whether a failure on `attempt` should be followed by another try.
    pub fn should_retry(&self, attempt: u32, error: &ApiError) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        match self.mode {
            RetryMode::Always => true,
            RetryMode::TransientOnly => error.is_transient(),
        }
    }
}
