use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::errors::Result;
use crate::storage::ShortLink;

#[derive(Clone)]
struct CachedLink {
    link: ShortLink,
    ttl: Duration,
}

/// Each entry lives for the TTL it was inserted with.
struct PerEntryExpiry;

impl Expiry<String, CachedLink> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedLink,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // An overwrite restarts the clock with the new TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedLink,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache backed by moka.
pub struct MokaObjectCache {
    inner: Cache<String, CachedLink>,
}

impl MokaObjectCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "MokaObjectCache initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get(&self, key: &str) -> Result<CacheResult> {
        Ok(match self.inner.get(key).await {
            Some(cached) => CacheResult::Found(cached.link),
            None => CacheResult::Miss,
        })
    }

    async fn insert(&self, key: &str, value: &ShortLink, ttl: Duration) -> Result<()> {
        self.inner
            .insert(
                key.to_string(),
                CachedLink {
                    link: value.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
