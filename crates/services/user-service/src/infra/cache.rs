//! Redis cache implementation.
//!
//! `CacheStore` is the capability the cache-aside layer depends on: plain
//! string keys and string values with a per-entry TTL. A missing key is
//! reported as `Ok(None)`, distinct from a transport failure.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use common::{AppResult, CacheConfig};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Key-value cache trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the raw value stored under `key` (None = absent or expired)
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;

    /// Remove `key`; returns whether an entry was removed
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Check if a live entry exists under `key`
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Check cache connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis.
    pub async fn connect(config: &CacheConfig) -> AppResult<Self> {
        let client = Client::open(config.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        let mut conn = self.connection.clone();
        // PSETEX rejects a zero expiry
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        conn.pset_ex::<_, _, ()>(key, value, millis).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
