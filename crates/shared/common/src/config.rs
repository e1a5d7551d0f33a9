//! Shared configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use domain::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_REDIS_URL,
};

/// Redis cache configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub url: String,
    pub default_ttl_seconds: u64,
}

impl CacheConfig {
    /// Time-to-live applied to cache-aside entries.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            default_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("url", &"[REDACTED]")
            .field("default_ttl_seconds", &self.default_ttl_seconds)
            .finish()
    }
}

/// Database configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_debug_redacts_urls() {
        let db = format!("{:?}", DatabaseConfig::default());
        let cache = format!("{:?}", CacheConfig::default());
        assert!(!db.contains("postgres://"));
        assert!(!cache.contains("redis://"));
        assert!(db.contains("[REDACTED]"));
    }
}
