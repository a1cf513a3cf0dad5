//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find user by user name (exact, case-sensitive match)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Check if user name exists
    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Create a user. Fails with `AuthError::DuplicateUser` when the name
    /// is already taken.
    async fn create(&self, user_name: &UserName, password_hash: &UserPassword)
    -> AuthResult<UserId>;

    /// Set the password for `user_name`, creating the record if absent.
    /// An existing record keeps its identifier.
    async fn upsert_password(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId>;
}

/// Registration allow-list
#[trait_variant::make(AllowListRepository: Send)]
pub trait LocalAllowListRepository {
    /// Whether `user_name` may self-register
    async fn is_allowed(&self, user_name: &UserName) -> AuthResult<bool>;
}
