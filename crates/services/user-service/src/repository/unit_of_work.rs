//! Unit of Work pattern implementation.
//!
//! Groups several store statements into one database transaction:
//! committed together when the closure succeeds, rolled back together
//! when it fails. Nothing done through a `TransactionContext` is visible
//! to other connections before the commit.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IsolationLevel, QueryFilter, QuerySelect, TransactionTrait,
};

use common::{AppError, AppResult};
use domain::{User, UserId};

use super::entities::user::{self, Entity as UserEntity};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Transaction runner over a database connection.
#[derive(Clone)]
pub struct Persistence {
    db: Arc<DatabaseConnection>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    /// Uses ReadCommitted isolation; row locks taken inside the closure
    /// serialize conflicting writers.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let outcome = f(TransactionContext::new(&txn)).await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> TxUserRepository<'a> {
        TxUserRepository { txn: self.txn }
    }
}

/// Transaction-aware user statements.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxUserRepository<'_> {
    /// Read a user and hold a row lock on it until the transaction ends
    pub async fn lock_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    /// Overwrite a user's display name
    pub async fn rename(&self, id: UserId, name: &str) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Name, Expr::value(name.to_owned()))
            .filter(user::Column::Id.eq(id))
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// Delete a user by ID
    pub async fn delete(&self, id: UserId) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
