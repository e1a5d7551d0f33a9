//! User repository implementation over the authoritative store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::unit_of_work::Persistence;
use common::{AppError, AppResult, OptionExt};
use domain::{recent_cutoff, User, UserId};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// This is the sole writer of user state. Nothing here reads or writes the
/// cache; callers that also read through `CachedUserRepository` must
/// invalidate after a successful write.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn get(&self, id: UserId) -> AppResult<User>;

    /// Find user by email address
    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    /// Create a new user; the store assigns ID and creation time
    async fn create(&self, email: String, name: String) -> AppResult<User>;

    /// Replace email and name of an existing user
    async fn update(&self, id: UserId, email: String, name: String) -> AppResult<()>;

    /// Delete user by ID
    async fn delete(&self, id: UserId) -> AppResult<()>;

    /// List all users ordered by ID
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Case-insensitive `LIKE` match (`%`, `_`) on the name, ordered by ID
    async fn find_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<User>>;

    /// Count all users
    async fn count(&self) -> AppResult<u64>;

    /// Users created within the last `days` days, newest first.
    /// `0` means since the start of the current day.
    async fn recent_since(&self, days: u32) -> AppResult<Vec<User>>;

    /// Copy the source user's name onto the target, then delete the source.
    /// All three steps commit together or not at all.
    async fn transfer(&self, from_id: UserId, to_id: UserId) -> AppResult<()>;
}

/// Concrete implementation of UserRepository over SeaORM
pub struct UserStore {
    db: Arc<DatabaseConnection>,
    uow: Persistence,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let uow = Persistence::new(db.clone());
        Self { db, uow }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn get(&self, id: UserId) -> AppResult<User> {
        let result = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        result.map(User::from).ok_or_not_found()
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        result.map(User::from).ok_or_not_found()
    }

    async fn create(&self, email: String, name: String) -> AppResult<User> {
        let active_model = ActiveModel {
            id: NotSet,
            email: Set(email),
            name: Set(name),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await.map_err(AppError::from)?;
        tracing::debug!(user_id = model.id, "User created");
        Ok(User::from(model))
    }

    async fn update(&self, id: UserId, email: String, name: String) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Email, Expr::value(email))
            .col_expr(user::Column::Name, Expr::value(name))
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(user_id = id, "User updated");
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(user_id = id, "User deleted");
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                    .like(pattern.to_lowercase()),
            )
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        UserEntity::find()
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    async fn recent_since(&self, days: u32) -> AppResult<Vec<User>> {
        let cutoff = recent_cutoff(days, Utc::now());
        let models = UserEntity::find()
            .filter(user::Column::CreatedAt.gte(cutoff))
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn transfer(&self, from_id: UserId, to_id: UserId) -> AppResult<()> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let users = ctx.users();
                    let source = users.lock_by_id(from_id).await?.ok_or_not_found()?;
                    users.rename(to_id, &source.name).await?;
                    users.delete(from_id).await?;
                    Ok(())
                })
            })
            .await?;

        tracing::info!(from_id, to_id, "User data transferred");
        Ok(())
    }
}
