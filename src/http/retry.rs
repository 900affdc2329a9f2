//! Retry configuration, delay calculation, and the retry runner.
//!
//! [`RetryPolicy::run`] wraps one async operation and retries it on
//! transient errors (as classified by [`OpenLensError::is_transient()`](crate::OpenLensError::is_transient)).
//! Rate-limit responses honour the server's `Retry-After`; everything else
//! backs off exponentially.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::Result;

/// Configuration for retry behaviour on transient errors.
///
/// ```rust
/// # use openlens::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first one. 0 = no retry. Default: 3.
    pub max_retries: u32,
    /// Base delay before the first retry. Default: 75ms.
    pub initial_delay: Duration,
    /// Maximum backoff delay (caps exponential growth, not `Retry-After`).
    /// Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(75),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of additional attempts.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum backoff delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Backoff delay after the given failed attempt (0-indexed).
    ///
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Delay before the next attempt, preferring the server's `retry_after`.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Runs operations with retry.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute `f`, retrying transient errors up to `max_retries` times.
    ///
    /// Permanent errors are returned immediately. Once retries are
    /// exhausted the last error is returned.
    pub async fn run<F, Fut, T>(&self, endpoint: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    metrics::counter!(telemetry::RETRIES_TOTAL, "endpoint" => endpoint.to_owned())
                        .increment(1);
                    let delay = self.config.effective_delay(attempt, e.retry_after());
                    warn!(
                        endpoint,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
