//! Cache-aside reads over the user repository.
//!
//! Reads check the cache first and fall back to the repository on any cache
//! anomaly, writing the fetched record back with a fixed TTL. Writes are not
//! intercepted: the repository stays the only source of truth, and a cached
//! snapshot may lag a write by up to the TTL unless the caller invalidates.

use std::sync::Arc;
use std::time::Duration;

use common::AppResult;
use domain::{user_cache_key, User, UserId, DEFAULT_CACHE_TTL_SECONDS};

use super::user_repository::UserRepository;
use crate::infra::CacheStore;

/// Why a cache lookup did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No entry, or the entry expired
    Absent,
    /// An entry exists but does not decode as a user
    Corrupt,
    /// The cache could not be reached
    Unavailable,
}

/// Outcome of consulting the cache for one key.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(User),
    Miss(MissReason),
}

/// Read-through cache in front of a `UserRepository`.
#[derive(Clone)]
pub struct CachedUserRepository {
    store: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CachedUserRepository {
    /// Create a cache-aside reader with the default 5 minute TTL.
    pub fn new(store: Arc<dyn UserRepository>, cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, cache, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    pub fn with_ttl(
        store: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self { store, cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a user, serving from cache when a valid snapshot is present.
    ///
    /// Cache failures never reach the caller. Repository errors on the
    /// fallback path are returned unchanged.
    pub async fn get_cached(&self, id: UserId) -> AppResult<User> {
        let key = user_cache_key(id);

        match self.lookup(&key).await {
            CacheLookup::Hit(user) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(user);
            }
            CacheLookup::Miss(reason) => {
                tracing::debug!(key = %key, ?reason, "Cache miss");
            }
        }

        let user = self.store.get(id).await?;
        self.populate(&key, &user).await;
        Ok(user)
    }

    /// Remove any cached snapshot for `id`.
    ///
    /// Removing a key that is not cached succeeds; only a cache transport
    /// failure is an error.
    pub async fn invalidate(&self, id: UserId) -> AppResult<()> {
        let key = user_cache_key(id);
        let removed = self.cache.delete(&key).await?;
        tracing::debug!(key = %key, removed, "Cache entry invalidated");
        Ok(())
    }

    /// Check whether a snapshot for `id` is currently cached.
    pub async fn is_cached(&self, id: UserId) -> AppResult<bool> {
        self.cache.exists(&user_cache_key(id)).await
    }

    /// Classify the cache state for `key` as a hit or a miss with a reason.
    pub async fn lookup(&self, key: &str) -> CacheLookup {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::Miss(MissReason::Absent),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, falling back to store");
                return CacheLookup::Miss(MissReason::Unavailable);
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => CacheLookup::Hit(user),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                CacheLookup::Miss(MissReason::Corrupt)
            }
        }
    }

    /// Best-effort write-back; failures are logged and swallowed.
    async fn populate(&self, key: &str, user: &User) {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache serialization failed");
                return;
            }
        };

        if let Err(e) = self.cache.set_ex(key, json, self.ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::AppError;
    use mockall::predicate::eq;

    use crate::infra::{MemoryCache, MockCacheStore};
    use crate::repository::MockUserRepository;

    fn user(id: UserId, name: &str) -> User {
        User::new(id, format!("user{}@example.com", id), name.to_string(), Utc::now())
    }

    fn repo_returning(id: UserId, name: &'static str, times: usize) -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .with(eq(id))
            .times(times)
            .returning(move |id| Ok(user(id, name)));
        repo
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let repo = repo_returning(1, "Alice", 1);
        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(MemoryCache::new()));

        let first = cached.get_cached(1).await.unwrap();
        let second = cached.get_cached(1).await.unwrap();

        assert_eq!(first, second);
        assert!(cached.is_cached(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_forces_one_store_read() {
        let repo = repo_returning(1, "Alice", 2);
        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(MemoryCache::new()));

        cached.get_cached(1).await.unwrap();
        cached.invalidate(1).await.unwrap();
        assert!(!cached.is_cached(1).await.unwrap());

        cached.get_cached(1).await.unwrap();
        cached.get_cached(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_through_and_is_replaced() {
        let repo = repo_returning(3, "Carol", 1);
        let cache = Arc::new(MemoryCache::new());
        cache
            .set_ex("user:3", "{not json".into(), Duration::from_secs(60))
            .await
            .unwrap();
        let cached = CachedUserRepository::new(Arc::new(repo), cache.clone());

        assert!(matches!(
            cached.lookup("user:3").await,
            CacheLookup::Miss(MissReason::Corrupt)
        ));

        let fetched = cached.get_cached(3).await.unwrap();
        assert_eq!(fetched.name, "Carol");
        assert!(matches!(cached.lookup("user:3").await, CacheLookup::Hit(_)));
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_through() {
        let repo = repo_returning(1, "Alice", 1);
        let mut cache = MockCacheStore::new();
        cache
            .expect_get()
            .returning(|_| Err(AppError::cache_unavailable("connection refused")));
        cache.expect_set_ex().times(1).returning(|_, _, _| Ok(()));

        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(cache));
        let fetched = cached.get_cached(1).await.unwrap();
        assert_eq!(fetched.id, 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_swallowed() {
        let repo = repo_returning(1, "Alice", 1);
        let mut cache = MockCacheStore::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set_ex()
            .times(1)
            .returning(|_, _, _| Err(AppError::cache_unavailable("read-only replica")));

        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(cache));
        assert!(cached.get_cached(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_back_uses_configured_ttl() {
        let repo = repo_returning(5, "Eve", 1);
        let mut cache = MockCacheStore::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set_ex()
            .withf(|key, value, ttl| {
                key == "user:5" && value.contains("\"Eve\"") && *ttl == Duration::from_secs(42)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let cached = CachedUserRepository::with_ttl(
            Arc::new(repo),
            Arc::new(cache),
            Duration::from_secs(42),
        );
        cached.get_cached(5).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_error_propagates_and_nothing_is_cached() {
        let mut repo = MockUserRepository::new();
        repo.expect_get().returning(|_| Err(AppError::NotFound));
        let mut cache = MockCacheStore::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set_ex().never();

        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(cache));
        assert!(matches!(cached.get_cached(9).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_get()
            .returning(|_| Err(AppError::store_unavailable("pool timed out")));
        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(MemoryCache::new()));

        assert!(matches!(
            cached.get_cached(1).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_is_ok() {
        let repo = MockUserRepository::new();
        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(MemoryCache::new()));
        assert!(cached.invalidate(404).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalidate_surfaces_transport_failure() {
        let repo = MockUserRepository::new();
        let mut cache = MockCacheStore::new();
        cache
            .expect_delete()
            .with(eq("user:1"))
            .returning(|_| Err(AppError::cache_unavailable("connection reset")));

        let cached = CachedUserRepository::new(Arc::new(repo), Arc::new(cache));
        assert!(matches!(
            cached.invalidate(1).await,
            Err(AppError::CacheUnavailable(_))
        ));
    }
}
