//! CacheService expiry and eviction, driven by a paused clock.

use std::time::Duration;

use openlens::{CacheConfig, CacheService};

fn cache(max_entries: usize, ttl_secs: u64) -> CacheService<String> {
    CacheService::new(
        "test",
        CacheConfig::new()
            .max_entries(max_entries)
            .ttl(Duration::from_secs(ttl_secs)),
    )
}

#[tokio::test(start_paused = true)]
async fn evicts_oldest_write_not_least_recently_read() {
    let cache = cache(2, 60);
    cache.set("a", "first".to_string());
    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set("b", "second".to_string());

    // Reading "a" does not protect it.
    assert_eq!(cache.get("a").as_deref(), Some("first"));
    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set("c", "third".to_string());

    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
    assert_eq!(cache.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_purged_by_get() {
    let cache = cache(10, 30);
    cache.set("MIT", "record".to_string());

    tokio::time::advance(Duration::from_secs(29)).await;
    assert_eq!(cache.get("MIT").as_deref(), Some("record"));

    tokio::time::advance(Duration::from_secs(2)).await;
    // Still held until a read observes it.
    assert!(cache.has("MIT"));
    assert!(cache.valid_keys().is_empty());

    assert_eq!(cache.get("MIT"), None);
    assert!(!cache.has("MIT"));
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stats_separate_valid_from_expired() {
    let cache = cache(10, 5);
    cache.set("old", "x".to_string());
    tokio::time::advance(Duration::from_secs(10)).await;
    cache.set("new", "y".to_string());

    let stats = cache.stats();
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.valid_entries, 1);
    assert_eq!(cache.valid_keys(), vec!["new".to_string()]);
}

#[test]
fn delete_and_clear() {
    let cache = cache(10, 60);
    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());

    cache.delete("a");
    assert!(!cache.has("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
