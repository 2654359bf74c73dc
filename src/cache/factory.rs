use std::sync::Arc;

use tracing::{error, info, warn};

use super::object_cache::{MokaObjectCache, NullObjectCache, RedisObjectCache};
use super::ObjectCache;
use crate::config::CacheConfig;

pub struct CacheFactory;

impl CacheFactory {
    /// Builds the configured cache. An unreachable Redis is not fatal: the
    /// service runs persistence-only on the null cache.
    pub async fn create(config: &CacheConfig) -> Arc<dyn ObjectCache> {
        if !config.enabled {
            info!("Cache disabled, resolving from storage only");
            return Arc::new(NullObjectCache);
        }

        let cache: Arc<dyn ObjectCache> = match config.cache_type.as_str() {
            "redis" => match RedisObjectCache::connect(&config.redis).await {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    error!(
                        "{}; falling back to null cache",
                        e.format_simple()
                    );
                    Arc::new(NullObjectCache)
                }
            },
            "memory" => Arc::new(MokaObjectCache::new(config.memory.max_capacity)),
            "null" => Arc::new(NullObjectCache),
            other => {
                warn!("Unknown cache type '{}', using null cache", other);
                Arc::new(NullObjectCache)
            }
        };

        info!(
            "Cache initialized: {} (ttl {}s)",
            cache.name(),
            config.default_ttl
        );
        cache
    }
}
