//! Bounded retry with exponential backoff for the OTP RPC calls.
//!
//! The engine is stateless between calls: its only observable effect is
//! invoking the operation up to `max_attempts` times with the policy's
//! delays. Non-retryable failures short-circuit without consuming the
//! remaining budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::common::AuthError;

/// Attempt budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each one after.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt` (1-based). The first attempt
    /// runs immediately; attempt i waits `initial_delay * 2^(i-2)`,
    /// saturating once the doubling no longer fits.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            None
        } else {
            let factor = 2u32.checked_pow(attempt - 2).unwrap_or(u32::MAX);
            Some(self.initial_delay.saturating_mul(factor))
        }
    }
}

/// Run `operation` until it succeeds or the policy's budget runs out.
///
/// Errors whose `is_retryable()` is false are returned immediately; the
/// last error is returned once attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, AuthError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuthError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        if let Some(delay) = policy.delay_before(attempt) {
            debug!(
                "retry attempt {}/{} after {}ms delay",
                attempt,
                max_attempts,
                delay.as_millis()
            );
            sleep(delay).await;
        }

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("operation succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                debug!("non-retryable failure on attempt {}: {}", attempt, err);
                return Err(err);
            }
            Err(err) => {
                warn!("attempt {}/{} failed: {}", attempt, max_attempts, err);
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AuthError::Transient("retry budget exhausted".to_string())))
}
