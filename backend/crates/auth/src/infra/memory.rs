//! In-Memory Repository
//!
//! Process-local credential store for tests and local runs without a
//! database. Clones share the same state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kernel::id::UserId;
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserName, User>,
    allowed: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registration allow-list
    pub fn with_allowed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = State {
            allowed: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            ..Default::default()
        }
    }

    pub async fn allow(&self, user_name: impl Into<String>) {
        self.state.write().await.allowed.insert(user_name.into());
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Make every operation fail as if the backing store were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self, operation: &'static str, user_name: &UserName) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::store(operation, user_name)(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "in-memory store marked unavailable",
            )));
        }
        Ok(())
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        self.check("lookup_user", user_name)?;
        Ok(self.state.read().await.users.get(user_name).cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        self.check("user_exists", user_name)?;
        Ok(self.state.read().await.users.contains_key(user_name))
    }

    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        self.check("insert_user", user_name)?;
        let mut state = self.state.write().await;
        if state.users.contains_key(user_name) {
            return Err(AuthError::DuplicateUser);
        }

        let user = User::new(user_name.clone(), password_hash.clone());
        let user_id = user.user_id;
        state.users.insert(user_name.clone(), user);
        Ok(user_id)
    }

    async fn upsert_password(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        self.check("update_password", user_name)?;
        let mut state = self.state.write().await;
        let user = state
            .users
            .entry(user_name.clone())
            .and_modify(|user| user.change_password(password_hash.clone()))
            .or_insert_with(|| User::new(user_name.clone(), password_hash.clone()));
        Ok(user.user_id)
    }
}

impl AllowListRepository for InMemoryAuthRepository {
    async fn is_allowed(&self, user_name: &UserName) -> AuthResult<bool> {
        self.check("is_allowed", user_name)?;
        Ok(self.state.read().await.allowed.contains(user_name.as_str()))
    }
}
