//! Credential Store
//!
//! The operations the authentication flow needs from persistence, on top
//! of the repository traits. Password hashing and verification run on the
//! blocking pool.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::HashingParams;

use crate::domain::entity::user::User;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::domain::value_object::{
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct CredentialStore<R> {
    repo: Arc<R>,
    hashing: HashingParams,
}

impl<R> CredentialStore<R>
where
    R: UserRepository + AllowListRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, hashing: HashingParams) -> Self {
        Self { repo, hashing }
    }

    /// The stored user, or `UserNotFound`
    pub async fn lookup_user(&self, user_name: &UserName) -> AuthResult<User> {
        self.repo
            .find_by_user_name(user_name)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn user_exists(&self, user_name: &UserName) -> AuthResult<bool> {
        self.repo.exists_by_user_name(user_name).await
    }

    pub async fn is_allowed(&self, user_name: &UserName) -> AuthResult<bool> {
        self.repo.is_allowed(user_name).await
    }

    /// True only when the user exists and the password matches
    pub async fn verify_password(
        &self,
        user_name: &UserName,
        password: &RawPassword,
    ) -> AuthResult<bool> {
        match self.repo.find_by_user_name(user_name).await? {
            Some(user) => Ok(user.password_hash.verify(password).await?),
            None => Ok(false),
        }
    }

    pub async fn hash_password(&self, password: &RawPassword) -> AuthResult<UserPassword> {
        Ok(UserPassword::from_raw(password, self.hashing).await?)
    }

    /// Fails with `DuplicateUser` when the name is taken
    pub async fn insert_user(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        self.repo.create(user_name, password_hash).await
    }

    /// Create-or-replace; an existing user keeps its identifier
    pub async fn update_password(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        self.repo.upsert_password(user_name, password_hash).await
    }
}
