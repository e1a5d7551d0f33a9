//! Unified error handling for the record store and the cache.
//!
//! A single error type that every store and cache operation returns.
//! Driver errors (sea-orm, redis) are classified into the caller-facing
//! kinds when the matching cargo feature is enabled.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    // External service errors
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get stable error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error came from a transport or backend failure rather
    /// than from the state of the data.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::CacheUnavailable(_)
        )
    }
}

// =============================================================================
// Driver Error Conversion
// =============================================================================

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let sea_orm::DbErr::RecordNotFound(_) = err {
            return AppError::NotFound;
        }
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::Conflict(detail);
        }

        tracing::error!("Database error: {:?}", err);
        AppError::StoreUnavailable(err.to_string())
    }
}

#[cfg(feature = "cache")]
impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("Redis error: {}", err);
        AppError::CacheUnavailable(err.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        AppError::StoreUnavailable(msg.into())
    }

    pub fn cache_unavailable(msg: impl Into<String>) -> Self {
        AppError::CacheUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound.code(), "NOT_FOUND");
        assert_eq!(AppError::conflict("email").code(), "CONFLICT");
        assert_eq!(AppError::store_unavailable("down").code(), "STORE_UNAVAILABLE");
        assert_eq!(AppError::cache_unavailable("down").code(), "CACHE_UNAVAILABLE");
        assert_eq!(AppError::internal("oops").code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(AppError::store_unavailable("x").is_unavailable());
        assert!(AppError::cache_unavailable("x").is_unavailable());
        assert!(!AppError::NotFound.is_unavailable());
        assert!(!AppError::conflict("x").is_unavailable());
    }

    #[test]
    fn test_ok_or_not_found() {
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
        assert!(matches!(None::<i32>.ok_or_not_found(), Err(AppError::NotFound)));
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_db_error_mapping() {
        let not_found: AppError = sea_orm::DbErr::RecordNotFound("users".into()).into();
        assert!(matches!(not_found, AppError::NotFound));

        let other: AppError = sea_orm::DbErr::Custom("connection reset".into()).into();
        assert!(matches!(other, AppError::StoreUnavailable(_)));
    }
}
