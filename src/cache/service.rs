//! Time-boxed, size-bounded key/value cache.
//!
//! [`CacheService`] is a TTL + FIFO hybrid: entries expire `ttl` after they
//! were written, and when the cache is full the entry with the oldest write
//! timestamp is evicted, regardless of how recently it was read.
//!
//! Expired entries are purged lazily, on the read that observes them.
//!
//! Timestamps use [`tokio::time::Instant`], so tests can drive expiry with
//! a paused clock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::telemetry;

/// Configuration for a [`CacheService`].
///
/// ```rust
/// # use openlens::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(200)
///     .ttl(Duration::from_secs(30 * 60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries. Default: 1,000.
    pub max_entries: usize,
    /// Time-to-live, measured from the write. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for institution records: 30 minutes, 200 entries.
    pub fn institutions() -> Self {
        Self {
            max_entries: 200,
            ttl: Duration::from_secs(30 * 60),
        }
    }

    /// Defaults for works aggregates: 5 minutes, 500 entries.
    pub fn works() -> Self {
        Self {
            max_entries: 500,
            ttl: Duration::from_secs(5 * 60),
        }
    }

    /// Set the maximum number of entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A cached value and the time it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Instant,
    // Breaks timestamp ties so eviction order is deterministic.
    seq: u64,
}

/// Snapshot of a cache's occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries held, including expired ones not yet purged.
    pub total_entries: usize,
    /// Entries still within their TTL.
    pub valid_entries: usize,
    pub max_entries: usize,
    pub ttl: Duration,
}

struct Entries<T> {
    map: HashMap<String, CacheEntry<T>>,
    next_seq: u64,
}

/// Thread-safe TTL cache with oldest-write eviction.
///
/// One instance per data category. The `name` labels its metrics.
pub struct CacheService<T> {
    name: &'static str,
    config: CacheConfig,
    entries: Mutex<Entries<T>>,
}

impl<T: Clone> CacheService<T> {
    /// Create an empty cache.
    pub fn new(name: &'static str, config: CacheConfig) -> Self {
        Self {
            name,
            config,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Name used as the `cache` metric label.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a value.
    ///
    /// Returns `None` when the key is absent or expired; an expired entry is
    /// removed by this read.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let now = Instant::now();
        let hit = match entries.map.get(key) {
            Some(entry) if self.is_valid(entry, now) => Some(entry.data.clone()),
            Some(_) => {
                entries.map.remove(key);
                None
            }
            None => None,
        };
        drop(entries);

        let metric = if hit.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(metric, "cache" => self.name).increment(1);
        hit
    }

    /// Insert or overwrite a value, stamped with the current time.
    ///
    /// When the cache is full and `key` is new, the entry with the oldest
    /// write timestamp is evicted first.
    pub fn set(&self, key: impl Into<String>, data: T) {
        if self.config.max_entries == 0 {
            return;
        }
        let key = key.into();
        let mut entries = self.lock();
        if !entries.map.contains_key(&key) && entries.map.len() >= self.config.max_entries {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, entry)| (entry.timestamp, entry.seq))
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.map.remove(&oldest);
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "cache" => self.name)
                    .increment(1);
            }
        }
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.map.insert(
            key,
            CacheEntry {
                data,
                timestamp: Instant::now(),
                seq,
            },
        );
    }

    /// Whether an entry is held for `key`.
    ///
    /// Does not check expiry; an expired entry counts until a [`get`](Self::get)
    /// purges it.
    pub fn has(&self, key: &str) -> bool {
        self.lock().map.contains_key(key)
    }

    /// Remove an entry.
    pub fn delete(&self, key: &str) {
        self.lock().map.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().map.clear();
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys whose entries are still within their TTL.
    pub fn valid_keys(&self) -> Vec<String> {
        let entries = self.lock();
        let now = Instant::now();
        entries
            .map
            .iter()
            .filter(|(_, entry)| self.is_valid(entry, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Occupancy statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let now = Instant::now();
        CacheStats {
            total_entries: entries.map.len(),
            valid_entries: entries
                .map
                .values()
                .filter(|entry| self.is_valid(entry, now))
                .count(),
            max_entries: self.config.max_entries,
            ttl: self.config.ttl,
        }
    }

    fn is_valid(&self, entry: &CacheEntry<T>, now: Instant) -> bool {
        now.saturating_duration_since(entry.timestamp) <= self.config.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Entries<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
