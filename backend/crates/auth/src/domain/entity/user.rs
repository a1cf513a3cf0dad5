//! User Entity
//!
//! A registered account together with its stored password hash.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Stable identifier, assigned on first registration
    pub user_id: UserId,
    /// Unique, case-sensitive login handle
    pub user_name: UserName,
    pub password_hash: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identifier
    pub fn new(user_name: UserName, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            user_name,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the password hash, keeping the identifier
    pub fn change_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}
