//! Topic display-name cache.
//!
//! Topic names never change in practice, so lookups done while restoring a
//! `topic` URL parameter are kept in a moka LRU + TTL cache rather than the
//! oldest-write [`CacheService`](super::CacheService).

use std::time::Duration;

use moka::future::Cache;

use super::CacheConfig;
use crate::telemetry;
use crate::types::Topic;

/// Defaults for the topic cache: 1 hour, 1,000 entries.
pub fn default_topic_cache_config() -> CacheConfig {
    CacheConfig {
        max_entries: 1_000,
        ttl: Duration::from_secs(3600),
    }
}

/// Async cache of resolved topics, keyed on the id they were requested by.
pub struct TopicCache {
    cache: Cache<String, Topic>,
}

impl TopicCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries as u64)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up a topic. Emits cache hit/miss metrics.
    pub async fn get(&self, id: &str) -> Option<Topic> {
        let hit = self.cache.get(id).await;
        let metric = if hit.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(metric, "cache" => "topics").increment(1);
        hit
    }

    pub async fn insert(&self, id: impl Into<String>, topic: Topic) {
        self.cache.insert(id.into(), topic).await;
    }
}

impl Default for TopicCache {
    fn default() -> Self {
        Self::new(&default_topic_cache_config())
    }
}
