//! Domain layer - Core record types and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Both the record store and the cache-aside layer share these types.

pub mod constants;
pub mod recency;
pub mod user;

pub use constants::*;
pub use recency::recent_cutoff;
pub use user::{User, UserId};
