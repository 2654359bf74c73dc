use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CacheResult, ObjectCache};
use crate::errors::Result;
use crate::storage::ShortLink;

/// Used when caching is disabled or the configured backend is unreachable.
pub struct NullObjectCache;

#[async_trait]
impl ObjectCache for NullObjectCache {
    async fn get(&self, key: &str) -> Result<CacheResult> {
        trace!("NullObjectCache.get called for key: {}", key);
        Ok(CacheResult::Miss)
    }

    async fn insert(&self, key: &str, _: &ShortLink, _ttl: Duration) -> Result<()> {
        trace!("NullObjectCache.insert called for key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        trace!("NullObjectCache.remove called for key: {}", key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
