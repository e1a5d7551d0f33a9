//! User Service Library
//!
//! Read/write access to the user record store, plus a cache-aside layer for
//! hot-path lookups by ID. All writes go to the store; callers that need
//! fresh cached reads invalidate the affected entries after a write.

pub mod config;
pub mod infra;
pub mod repository;

use std::sync::Arc;

use common::{AppError, AppResult};

use crate::config::UserServiceConfig;
use crate::infra::{CacheStore, Database, RedisCache};
use crate::repository::{CachedUserRepository, UserRepository, UserStore};

/// Process-wide handles, built once at startup and passed explicitly.
pub struct Components {
    pub database: Database,
    pub cache: Arc<dyn CacheStore>,
    pub users: Arc<dyn UserRepository>,
    pub cached_users: CachedUserRepository,
}

impl Components {
    /// Connect to the database and Redis and wire the repositories.
    pub async fn connect(config: &UserServiceConfig) -> AppResult<Self> {
        let database = Database::connect(&config.database)
            .await
            .map_err(AppError::from)?;
        let cache: Arc<dyn CacheStore> = Arc::new(RedisCache::connect(&config.cache).await?);

        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(database.get_connection()));
        let cached_users =
            CachedUserRepository::with_ttl(users.clone(), cache.clone(), config.cache_ttl());
        tracing::debug!(ttl_secs = cached_users.ttl().as_secs(), "Cache-aside reader ready");

        Ok(Self {
            database,
            cache,
            users,
            cached_users,
        })
    }

    /// Check that both the database and the cache respond.
    pub async fn health(&self) -> AppResult<()> {
        self.database.ping().await.map_err(AppError::from)?;
        self.cache.ping().await?;
        Ok(())
    }
}
