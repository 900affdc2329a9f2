//! Caching subsystem.
//!
//! Two kinds of cache:
//!
//! - [`CacheService`]: TTL cache with oldest-write eviction. The
//!   [`InstitutionDataService`](crate::InstitutionDataService) owns two of
//!   them, one for institution records (keyed on the raw search term) and
//!   one for works aggregates (keyed on institution id and topic filter).
//!   Both live for the whole session.
//!
//! - [`TopicCache`]: moka-backed LRU + TTL cache for topic display names.

mod service;
mod topics;

pub use service::{CacheConfig, CacheEntry, CacheService, CacheStats};
pub use topics::{TopicCache, default_topic_cache_config};
