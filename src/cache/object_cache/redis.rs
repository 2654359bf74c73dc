use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::{CacheResult, ObjectCache};
use crate::config::RedisConfig;
use crate::errors::{Result, ShortlyError};
use crate::storage::ShortLink;

pub struct RedisObjectCache {
    client: redis::Client,
    /// 持久化连接，断开后下次调用时重建
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisObjectCache {
    /// Opens the client and checks the server answers `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.clone()).map_err(|e| {
            ShortlyError::cache_connection(format!("Invalid Redis URL {}: {}", config.url, e))
        })?;

        let cache = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
        };

        let mut conn = cache.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ShortlyError::cache_connection(format!("Redis ping failed: {}", e)))?;
        debug!(
            "Redis connection test successful: {} (prefix '{}')",
            pong, cache.key_prefix
        );

        Ok(cache)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ShortlyError::cache_connection(format!("Redis connect failed: {}", e)))?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// Drops the cached connection before reporting a command failure so the
    /// next call reconnects.
    async fn command_failed(&self, op: &str, key: &str, err: redis::RedisError) -> ShortlyError {
        self.reset_connection().await;
        ShortlyError::cache_connection(format!("Redis {} '{}' failed: {}", op, key, err))
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectCache for RedisObjectCache {
    async fn get(&self, key: &str) -> Result<CacheResult> {
        let mut conn = self.get_connection().await?;

        let data: Option<String> = match conn.get(self.make_key(key)).await {
            Ok(data) => data,
            Err(e) => return Err(self.command_failed("GET", key, e).await),
        };

        match data {
            Some(data) => {
                let link: ShortLink = serde_json::from_str(&data).map_err(|e| {
                    ShortlyError::serialization(format!(
                        "Bad cached snapshot for '{}': {}",
                        key, e
                    ))
                })?;
                trace!("Successfully retrieved key: {}", key);
                Ok(CacheResult::Found(link))
            }
            None => {
                trace!("Key not found in cache: {}", key);
                Ok(CacheResult::Miss)
            }
        }
    }

    async fn insert(&self, key: &str, value: &ShortLink, ttl: Duration) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        // SETEX rejects 0
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.get_connection().await?;
        if let Err(e) = conn
            .set_ex::<String, String, ()>(self.make_key(key), serialized, ttl_secs)
            .await
        {
            return Err(self.command_failed("SETEX", key, e).await);
        }

        trace!("Successfully inserted key into cache: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;

        match conn.del::<String, i32>(self.make_key(key)).await {
            Ok(deleted) => {
                trace!("Removed key {} from cache ({} deleted)", key, deleted);
                Ok(())
            }
            Err(e) => Err(self.command_failed("DEL", key, e).await),
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
