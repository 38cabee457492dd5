//! Bounded exponential backoff for provider calls.
//!
//! Only rate-limit responses are retried. Any other error, or a rate limit on
//! the last allowed attempt, is returned to the caller, which logs it and moves
//! on to the next identity.

use std::future::Future;
use std::time::Duration;

use super::error::ProviderResult;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately; used by tests and the mock providers.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `attempt` (0-based). A server `Retry-After`
    /// hint wins when it is longer, but never past `max_delay`.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let base = Duration::from_millis(base_ms.min(self.max_delay.as_millis() as f64) as u64);
        match hint {
            Some(hint) => hint.max(base).min(self.max_delay),
            None => base,
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            attempt += 1;
            if !err.is_rate_limited() {
                return Err(err);
            }
            if attempt >= attempts {
                tracing::error!(
                    operation,
                    attempts,
                    "Rate-limit retry budget exhausted, abandoning call"
                );
                return Err(err);
            }

            let hint = match &err {
                super::ProviderError::RateLimited { retry_after } => *retry_after,
                _ => None,
            };
            let delay = self.delay_for(attempt - 1, hint);
            tracing::debug!(
                operation,
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                "Rate limited, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
