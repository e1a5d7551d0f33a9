//! User service configuration.

use std::env;
use std::time::Duration;

use common::{CacheConfig, DatabaseConfig};
use domain::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_REDIS_URL,
};

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    /// Authoritative store connection settings
    pub database: DatabaseConfig,
    /// Redis settings for the cache-aside layer
    pub cache: CacheConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Service-prefixed variables win over the generic ones; missing or
    /// unparseable values fall back to the development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database: DatabaseConfig {
                url: env::var("USER_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_MIN_CONNECTIONS),
            },
            cache: CacheConfig {
                url: env::var("USER_SERVICE_REDIS_URL")
                    .or_else(|_| env::var("REDIS_URL"))
                    .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
                default_ttl_seconds: parse_var("USER_SERVICE_CACHE_TTL_SECONDS")
                    .or_else(|| parse_var("CACHE_TTL_SECONDS"))
                    .unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
            },
        }
    }

    /// Time-to-live for cache-aside entries.
    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
