use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::ShortLink;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    Found(ShortLink),
    Miss,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// A snapshot that cannot be decoded is reported as an error.
    async fn get(&self, key: &str) -> Result<CacheResult>;

    async fn insert(&self, key: &str, value: &ShortLink, ttl: Duration) -> Result<()>;

    /// Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}
