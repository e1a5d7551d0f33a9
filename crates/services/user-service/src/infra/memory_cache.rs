//! In-process cache with per-entry deadlines, backed by moka.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{sync::Cache, Expiry};

use common::AppResult;

use super::cache::CacheStore;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// `CacheStore` held in process memory; stands in for Redis in tests and local runs.
///
/// Expired entries are invisible to every operation and are evicted by moka's
/// housekeeping, whether or not they are read again.
pub struct MemoryCache {
    entries: Cache<String, Entry>,
}

impl MemoryCache {
    const DEFAULT_CAPACITY: u64 = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value))
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        self.entries.insert(key.to_string(), Entry { value, ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let live = self.entries.contains_key(key);
        self.entries.invalidate(key);
        Ok(live)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
impl MemoryCache {
    /// Entries still held by the cache, expired or not, after housekeeping.
    fn resident_entries(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
