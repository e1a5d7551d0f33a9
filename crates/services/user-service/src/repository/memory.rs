//! In-process user store.
//!
//! Implements the same `UserRepository` contract as `UserStore` on top of an
//! ordered map. Every operation takes the table lock once, so multi-step
//! writes (transfer) are validated in full before anything is mutated and no
//! reader can observe an intermediate state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{recent_cutoff, User, UserId};

use super::user_repository::UserRepository;

struct Table {
    next_id: UserId,
    rows: BTreeMap<UserId, User>,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// `UserRepository` backed by memory; substitutes for the database in tests.
pub struct MemoryUserStore {
    table: RwLock<Table>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with an explicit creation time.
    ///
    /// Used for seeding fixtures; `create` calls this with the current time.
    pub async fn insert_at(
        &self,
        email: String,
        name: String,
        created_at: DateTime<Utc>,
    ) -> AppResult<User> {
        let mut table = self.table.write().await;
        if table.email_taken(&email, None) {
            return Err(AppError::conflict(format!("email {} already exists", email)));
        }

        let id = table.next_id;
        table.next_id += 1;

        let user = User::new(id, email, name, created_at);
        table.rows.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn get(&self, id: UserId) -> AppResult<User> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.table
            .read()
            .await
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn create(&self, email: String, name: String) -> AppResult<User> {
        let user = self.insert_at(email, name, Utc::now()).await?;
        tracing::debug!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn update(&self, id: UserId, email: String, name: String) -> AppResult<()> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Err(AppError::NotFound);
        }
        if table.email_taken(&email, Some(id)) {
            return Err(AppError::conflict(format!("email {} already exists", email)));
        }

        if let Some(user) = table.rows.get_mut(&id) {
            user.email = email;
            user.name = name;
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_name_pattern(&self, pattern: &str) -> AppResult<Vec<User>> {
        let matcher = like_to_regex(pattern)?;

        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|u| matcher.is_match(&u.name))
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn recent_since(&self, days: u32) -> AppResult<Vec<User>> {
        let cutoff = recent_cutoff(days, Utc::now());
        let mut users: Vec<User> = self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|u| u.created_since(cutoff))
            .cloned()
            .collect();

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn transfer(&self, from_id: UserId, to_id: UserId) -> AppResult<()> {
        let mut table = self.table.write().await;

        let name = table
            .rows
            .get(&from_id)
            .map(|u| u.name.clone())
            .ok_or(AppError::NotFound)?;
        let target = table.rows.get_mut(&to_id).ok_or(AppError::NotFound)?;

        target.name = name;
        table.rows.remove(&from_id);

        tracing::info!(from_id, to_id, "User data transferred");
        Ok(())
    }
}

/// Translate a SQL `LIKE` pattern into an anchored, case-insensitive regex.
///
/// `%` matches any run of characters, `_` exactly one, and a backslash makes
/// the next character literal. A pattern ending in a lone backslash is
/// rejected, as PostgreSQL does.
fn like_to_regex(pattern: &str) -> AppResult<Regex> {
    let mut re = String::from("(?is)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            '\\' => match chars.next() {
                Some(next) => re.push_str(&regex::escape(&next.to_string())),
                None => {
                    return Err(AppError::internal(
                        "LIKE pattern must not end with escape character",
                    ))
                }
            },
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| AppError::internal(format!("Invalid pattern: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_wildcards() {
        let re = like_to_regex("%smith%").unwrap();
        assert!(re.is_match("John Smith"));
        assert!(re.is_match("SMITHERS"));
        assert!(!re.is_match("Smyth"));

        let re = like_to_regex("J_n%").unwrap();
        assert!(re.is_match("Jane"));
        assert!(re.is_match("jon"));
        assert!(!re.is_match("Joan"));
    }

    #[test]
    fn test_like_is_anchored_and_escapes() {
        let re = like_to_regex("Smith").unwrap();
        assert!(re.is_match("smith"));
        assert!(!re.is_match("John Smith"));

        let re = like_to_regex("100\\%").unwrap();
        assert!(re.is_match("100%"));
        assert!(!re.is_match("1000"));

        let re = like_to_regex("a.b").unwrap();
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_like_rejects_trailing_escape() {
        assert!(matches!(like_to_regex("smith\\"), Err(AppError::Internal(_))));
        assert!(like_to_regex("smith\\\\").unwrap().is_match("Smith\\"));
    }

    #[tokio::test]
    async fn test_find_with_trailing_escape_fails() {
        let store = MemoryUserStore::new();
        store.create("a@example.com".into(), "A\\".into()).await.unwrap();
        assert!(store.find_by_name_pattern("A\\").await.is_err());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = MemoryUserStore::new();
        let a = store.create("a@example.com".into(), "A".into()).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.create("b@example.com".into(), "B".into()).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_update_may_keep_own_email() {
        let store = MemoryUserStore::new();
        let a = store.create("a@example.com".into(), "A".into()).await.unwrap();
        store
            .update(a.id, "a@example.com".into(), "A2".into())
            .await
            .unwrap();
        assert_eq!(store.get(a.id).await.unwrap().name, "A2");
    }
}
