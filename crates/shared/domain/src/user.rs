//! User record and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i32;

/// User record as held by the authoritative store.
///
/// `id` and `created_at` are assigned by the store on creation and never
/// change afterwards. `email` is the unique secondary key, `name` the
/// display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, email: String, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            created_at,
        }
    }

    /// Check if the record was created at or after `cutoff`
    pub fn created_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at >= cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_created_since() {
        let now = Utc::now();
        let user = User::new(1, "a@example.com".into(), "A".into(), now);

        assert!(user.created_since(now));
        assert!(user.created_since(now - Duration::days(1)));
        assert!(!user.created_since(now + Duration::seconds(1)));
    }

    #[test]
    fn test_snapshot_survives_json() {
        let user = User::new(7, "b@example.com".into(), "Bob".into(), Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
