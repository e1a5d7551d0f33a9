//! Infrastructure layer - database and cache adapters.

pub mod cache;
mod db;
mod memory_cache;

pub use cache::{CacheStore, RedisCache};
pub use db::Database;
pub use memory_cache::MemoryCache;

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
