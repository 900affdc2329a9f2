//! Telemetry metric name constants.
//!
//! Centralised metric names for openlens operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `openlens_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `endpoint`: API endpoint family (e.g. "institutions", "works", "topics")
//! - `status`: outcome: "ok" or "error"
//! - `cache`: cache instance name (e.g. "institutions", "works")
//! - `store`: state store name (e.g. "terms")

/// Total API requests dispatched through the scheduler (one per attempt).
///
/// Labels: `endpoint`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "openlens_requests_total";

/// Request duration in seconds, per attempt.
///
/// Labels: `endpoint`.
pub const REQUEST_DURATION_SECONDS: &str = "openlens_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `endpoint`.
pub const RETRIES_TOTAL: &str = "openlens_retries_total";

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "openlens_cache_hits_total";

/// Total cache misses, including reads of expired entries.
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "openlens_cache_misses_total";

/// Total entries evicted to make room for a new one.
///
/// Labels: `cache`.
pub const CACHE_EVICTIONS_TOTAL: &str = "openlens_cache_evictions_total";

/// Fetch results dropped because their slot changed while they were in flight.
///
/// Labels: `store`.
pub const STALE_RESULTS_TOTAL: &str = "openlens_stale_results_total";
