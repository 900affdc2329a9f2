//! Concurrency-limited, staggered request admission.
//!
//! [`RequestScheduler::schedule`] waits for one of `max_concurrent` slots
//! (FIFO-fair, so admission follows submission order), then sleeps
//! `priority * min_delay` while holding the slot, then runs the operation
//! through the [`RetryPolicy`]. Callers submitting a batch pass the batch
//! index as priority, so the batch reaches the API spread out over time
//! instead of in one burst.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::trace;

use super::retry::RetryPolicy;
use crate::{OpenLensError, Result};

/// Configuration for the [`RequestScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum simultaneously admitted operations. Default: 3.
    pub max_concurrent: usize,
    /// Stagger unit: an operation with priority `p` waits `p * min_delay`
    /// after admission. Default: 75ms.
    pub min_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            min_delay: Duration::from_millis(75),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency ceiling (minimum 1).
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set the stagger unit.
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Pre-delay applied to an operation of the given priority.
    pub fn stagger(&self, priority: usize) -> Duration {
        self.min_delay
            .saturating_mul(u32::try_from(priority).unwrap_or(u32::MAX))
    }
}

/// Global admission control for API calls.
pub struct RequestScheduler {
    config: SchedulerConfig,
    permits: Semaphore,
    retry: RetryPolicy,
    active: AtomicUsize,
}

impl RequestScheduler {
    pub fn new(config: SchedulerConfig, retry: RetryPolicy) -> Self {
        let permits = Semaphore::new(config.max_concurrent.max(1));
        Self {
            config,
            permits,
            retry,
            active: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Number of operations currently admitted.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Run `f` once admitted, staggered by `priority`, with retry.
    ///
    /// The slot is released when this returns, whether `f` succeeded,
    /// failed, or the returned future was dropped.
    pub async fn schedule<F, Fut, T>(&self, endpoint: &str, priority: usize, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| OpenLensError::Configuration("request scheduler closed".into()))?;
        let _slot = ActiveSlot::enter(&self.active);

        let stagger = self.config.stagger(priority);
        trace!(endpoint, priority, stagger_ms = stagger.as_millis() as u64, "admitted");
        if !stagger.is_zero() {
            tokio::time::sleep(stagger).await;
        }

        self.retry.run(endpoint, f).await
    }
}

struct ActiveSlot<'a>(&'a AtomicUsize);

impl<'a> ActiveSlot<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
