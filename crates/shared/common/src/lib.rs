//! Common utilities shared by the record store and the cache-aside layer.
//!
//! This crate provides:
//! - Unified error handling for store and cache failures
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
