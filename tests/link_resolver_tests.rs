//! Link resolver tests
//!
//! Cache-aside behavior observed through a link store that counts calls.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{CountingLinkStore, FailingCache};
use shortly::cache::{MokaObjectCache, NullObjectCache, ObjectCache};
use shortly::config::CacheConfig;
use shortly::errors::ShortlyError;
use shortly::services::{LinkResolver, RecentDeletes, ResolutionSource};

fn cache_config(ttl_secs: u64, count_cache_hits: bool) -> CacheConfig {
    CacheConfig {
        default_ttl: ttl_secs,
        count_cache_hits,
        ..Default::default()
    }
}

fn resolver_with(
    store: &Arc<CountingLinkStore>,
    cache: Arc<dyn ObjectCache>,
    config: &CacheConfig,
) -> LinkResolver {
    LinkResolver::new(store.clone(), cache, Arc::new(RecentDeletes::default()), config)
}

#[tokio::test]
async fn test_second_resolve_is_served_from_cache() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("abc", "https://example.com/a");
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(60, false),
    );

    let first = resolver.resolve("abc").await.unwrap();
    assert_eq!(first.long_url, "https://example.com/a");
    assert_eq!(first.source, ResolutionSource::Storage);
    assert_eq!(store.gets(), 1);

    let second = resolver.resolve("abc").await.unwrap();
    assert_eq!(second.long_url, "https://example.com/a");
    assert_eq!(second.source, ResolutionSource::Cache);
    assert_eq!(store.gets(), 1, "cache hit must not touch storage");
}

#[tokio::test]
async fn test_expired_cache_entry_falls_back_to_storage() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("ttl", "https://example.com/ttl");
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(1, false),
    );

    resolver.resolve("ttl").await.unwrap();
    assert_eq!(
        resolver.resolve("ttl").await.unwrap().source,
        ResolutionSource::Cache
    );

    tokio::time::sleep(Duration::from_millis(1300)).await;

    let after = resolver.resolve("ttl").await.unwrap();
    assert_eq!(after.source, ResolutionSource::Storage);
    assert_eq!(after.long_url, "https://example.com/ttl");
    assert_eq!(store.gets(), 2);
}

#[tokio::test]
async fn test_clicks_counted_on_storage_path_only_by_default() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("c", "https://example.com/c");
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(60, false),
    );

    assert!(resolver.resolve("c").await.unwrap().click_recorded);
    assert!(!resolver.resolve("c").await.unwrap().click_recorded);
    assert!(!resolver.resolve("c").await.unwrap().click_recorded);

    assert_eq!(store.clicks("c"), Some(1));
}

#[tokio::test]
async fn test_cache_hits_counted_when_enabled() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("c", "https://example.com/c");
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(60, true),
    );

    for _ in 0..3 {
        assert!(resolver.resolve("c").await.unwrap().click_recorded);
    }
    assert_eq!(store.clicks("c"), Some(3));
    assert_eq!(store.gets(), 1);
}

#[tokio::test]
async fn test_failing_cache_is_treated_as_miss() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("f", "https://example.com/f");
    let resolver = resolver_with(&store, Arc::new(FailingCache), &cache_config(60, false));

    for _ in 0..2 {
        let res = resolver.resolve("f").await.unwrap();
        assert_eq!(res.long_url, "https://example.com/f");
        assert_eq!(res.source, ResolutionSource::Storage);
    }
    assert_eq!(store.gets(), 2);
}

#[tokio::test]
async fn test_null_cache_always_reads_storage() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("n", "https://example.com/n");
    let resolver = resolver_with(&store, Arc::new(NullObjectCache), &cache_config(60, false));

    resolver.resolve("n").await.unwrap();
    resolver.resolve("n").await.unwrap();
    assert_eq!(store.gets(), 2);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let store = Arc::new(CountingLinkStore::new());
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(60, false),
    );

    assert!(matches!(
        resolver.resolve("missing").await,
        Err(ShortlyError::NotFound(_))
    ));
    assert_eq!(store.increment_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_click_failure_does_not_fail_resolution() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("x", "https://example.com/x");
    store.fail_increments.store(true, Ordering::SeqCst);
    let resolver = resolver_with(
        &store,
        Arc::new(MokaObjectCache::new(100)),
        &cache_config(60, false),
    );

    let res = resolver.resolve("x").await.unwrap();
    assert_eq!(res.long_url, "https://example.com/x");
    assert!(!res.click_recorded);
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_persistence_error() {
    let store = Arc::new(CountingLinkStore::new());
    store.seed("x", "https://example.com/x");
    store.fail_reads.store(true, Ordering::SeqCst);
    let resolver = resolver_with(&store, Arc::new(NullObjectCache), &cache_config(60, false));

    assert!(matches!(
        resolver.resolve("x").await,
        Err(ShortlyError::Persistence(_))
    ));
}
