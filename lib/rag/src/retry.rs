use std::future::Future;
use std::time::Duration;
use trimsight_core::{Error, Result};

/// Outcome of one failed attempt against the generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Worth retrying: transport failures, throttling, server errors
    Transient(String),
    /// Retrying cannot help: bad request, bad credentials, malformed reply
    Permanent(String),
}

/// Exponential backoff schedule for the generation adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after the `attempt`-th failure (1-based): `base * 2^(attempt-1)`,
    /// capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Drive `operation` until it succeeds, fails permanently, or runs out of
    /// attempts. The operation receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = std::result::Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Permanent(message)) => return Err(Error::Generation(message)),
                Err(AttemptError::Transient(message)) if attempt >= max_attempts => {
                    return Err(Error::Generation(format!(
                        "{} (gave up after {} attempts)",
                        message, attempt
                    )));
                }
                Err(AttemptError::Transient(message)) => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(attempt, max_attempts, ?delay, error = %message, "generation attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
