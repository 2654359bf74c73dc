//! Short code -> long URL, cache-aside
//!
//! Cache failures of any kind are logged and treated as a miss. Click
//! counting is best-effort and never fails a resolution. Snapshots of links
//! deleted while the lookup was in flight are dropped from the cache and
//! reported as not found.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use crate::cache::{CacheResult, ObjectCache};
use crate::config::CacheConfig;
use crate::errors::{Result, ShortlyError};
use crate::services::RecentDeletes;
use crate::storage::{LinkRepository, ShortLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub long_url: String,
    pub source: ResolutionSource,
    /// Whether the persisted click counter was bumped for this request.
    pub click_recorded: bool,
}

pub struct LinkResolver {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn ObjectCache>,
    recent_deletes: Arc<RecentDeletes>,
    cache_ttl: Duration,
    count_cache_hits: bool,
}

impl LinkResolver {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn ObjectCache>,
        recent_deletes: Arc<RecentDeletes>,
        config: &CacheConfig,
    ) -> Self {
        debug!(
            "LinkResolver: cache={} ttl={}s count_cache_hits={}",
            cache.name(),
            config.default_ttl,
            config.count_cache_hits
        );
        Self {
            links,
            cache,
            recent_deletes,
            cache_ttl: config.ttl(),
            count_cache_hits: config.count_cache_hits,
        }
    }

    pub async fn resolve(&self, code: &str) -> Result<Resolution> {
        match self.cache.get(code).await {
            Ok(CacheResult::Found(link)) if self.recent_deletes.contains(&link.id) => {
                return Err(self.drop_deleted(code, &link).await);
            }
            Ok(CacheResult::Found(link)) => {
                trace!("Cache hit for {}", code);
                // Cache hits are not counted unless configured; the stored
                // count then lags behind real traffic.
                let click_recorded = self.count_cache_hits && self.record_click(code).await;
                return Ok(Resolution {
                    long_url: link.long_url,
                    source: ResolutionSource::Cache,
                    click_recorded,
                });
            }
            Ok(CacheResult::Miss) => trace!("Cache miss for {}", code),
            Err(e) => warn!(
                "Cache {} lookup for {} failed, reading storage: {}",
                self.cache.name(),
                code,
                e
            ),
        }

        let link = self
            .links
            .get_link(code)
            .await
            .map_err(|e| {
                error!("Storage lookup for {} failed: {}", code, e);
                ShortlyError::persistence(e.to_string())
            })?
            .ok_or_else(|| ShortlyError::not_found(format!("no link for code '{}'", code)))?;

        if let Err(e) = self.cache.insert(code, &link, self.cache_ttl).await {
            warn!("Failed to cache {}: {}", code, e);
        }

        // The delete may have evicted before the insert above landed.
        if self.recent_deletes.contains(&link.id) {
            return Err(self.drop_deleted(code, &link).await);
        }

        let click_recorded = self.record_click(code).await;

        Ok(Resolution {
            long_url: link.long_url,
            source: ResolutionSource::Storage,
            click_recorded,
        })
    }

    async fn drop_deleted(&self, code: &str, link: &ShortLink) -> ShortlyError {
        debug!("Dropping cached snapshot of deleted link {} ({})", code, link.id);
        if let Err(e) = self.cache.remove(code).await {
            warn!("Failed to drop stale cache entry {}: {}", code, e);
        }
        ShortlyError::not_found(format!("no link for code '{}'", code))
    }

    async fn record_click(&self, code: &str) -> bool {
        match self.links.increment_clicks(code).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to record click for {}: {}", code, e);
                false
            }
        }
    }
}
