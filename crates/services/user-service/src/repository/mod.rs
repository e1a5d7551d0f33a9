//! Repository layer for data access.
//!
//! - `UserRepository`: authoritative record store (SeaORM or in-memory)
//! - `CachedUserRepository`: cache-aside reads layered on top of it
//! - `Persistence`: unit of work for multi-statement atomic writes

mod cached_user_repository;
pub mod entities;
mod memory;
mod unit_of_work;
mod user_repository;

pub use cached_user_repository::{CacheLookup, CachedUserRepository, MissReason};
pub use memory::MemoryUserStore;
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, TxUserRepository};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
