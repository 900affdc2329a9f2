//! RetryPolicy backoff and error classification, with a paused clock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use openlens::{OpenLensError, Result, RetryConfig, RetryPolicy};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

/// Operation that fails `failures` times with `fail_with`, then succeeds.
struct FailThenSucceed {
    remaining: AtomicU32,
    calls: AtomicU32,
    fail_with: fn() -> OpenLensError,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> OpenLensError) -> Self {
        Self {
            remaining: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
            fail_with,
        }
    }

    async fn call(&self) -> Result<&'static str> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.remaining.load(Ordering::Relaxed) > 0 {
            self.remaining.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        Ok("ok")
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

fn rate_limited() -> OpenLensError {
    OpenLensError::RateLimited { retry_after: None }
}

#[tokio::test(start_paused = true)]
async fn rate_limited_twice_then_success_backs_off() {
    let op = FailThenSucceed::new(2, rate_limited);
    let policy = RetryPolicy::default();

    let start = Instant::now();
    let result = policy.run("institutions", || op.call()).await;

    assert_eq!(assert_ok!(result), "ok");
    assert_eq!(op.calls(), 3);
    // 75ms after the first failure, 150ms after the second.
    assert!(start.elapsed() >= Duration::from_millis(225));
    assert!(start.elapsed() < Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn retry_after_overrides_backoff() {
    let op = FailThenSucceed::new(1, || OpenLensError::RateLimited {
        retry_after: Some(Duration::from_secs(2)),
    });
    let policy = RetryPolicy::default();

    let start = Instant::now();
    assert_ok!(policy.run("works", || op.call()).await);
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_return_last_error() {
    let op = FailThenSucceed::new(10, || OpenLensError::Api {
        status: 503,
        message: "unavailable".into(),
    });
    let policy = RetryPolicy::default();

    let err = assert_err!(policy.run("works", || op.call()).await);
    assert!(matches!(err, OpenLensError::Api { status: 503, .. }));
    // One initial attempt plus three retries.
    assert_eq!(op.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn permanent_errors_are_not_retried() {
    let op = FailThenSucceed::new(1, || OpenLensError::Api {
        status: 400,
        message: "bad filter".into(),
    });
    let policy = RetryPolicy::default();

    let start = Instant::now();
    assert_err!(policy.run("works", || op.call()).await);
    assert_eq!(op.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn disabled_policy_makes_one_attempt() {
    let op = FailThenSucceed::new(1, || OpenLensError::Timeout(Duration::from_secs(5)));
    let policy = RetryPolicy::new(RetryConfig::disabled());

    assert_err!(policy.run("institutions", || op.call()).await);
    assert_eq!(op.calls(), 1);
}
