//! Authenticate Use Case
//!
//! Signs in a known user, or registers an allow-listed one on first login,
//! and issues a bearer token.
//!
//! Decision order:
//! 1. Password matches a stored user: issue a token
//! 2. User exists: `InvalidCredentials`
//! 3. User not on the allow-list: `NotAllowed`
//! 4. Otherwise register, then issue a token
//!
//! A registration that loses a race against a concurrent one re-checks the
//! password against the winner's record.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::credential_store::CredentialStore;
use crate::application::token::TokenIssuer;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::domain::value_object::{
    credentials::Credentials, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Body field carrying the password on login
pub const PASSWORD_FIELD: &str = "password";

/// Authenticate input
pub struct AuthenticateInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Authenticate output
#[derive(Debug)]
pub struct AuthenticateOutput {
    pub token: String,
    pub user_id: UserId,
    /// Whether this call created the account
    pub registered: bool,
}

/// Authenticate use case
pub struct AuthenticateUseCase<R> {
    store: CredentialStore<R>,
    tokens: Arc<TokenIssuer>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository + AllowListRepository + Send + Sync + 'static,
{
    pub fn new(store: CredentialStore<R>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> AuthResult<AuthenticateOutput> {
        let Credentials {
            user_name,
            password,
        } = Credentials::parse(input.username, input.password, PASSWORD_FIELD)
            .map_err(AuthError::Validation)?;

        tracing::info!(user_name = %user_name, "Login attempt");

        let mut registered = false;
        if !self.store.verify_password(&user_name, &password).await? {
            if self.store.user_exists(&user_name).await? {
                tracing::info!(user_name = %user_name, "Wrong password");
                return Err(AuthError::InvalidCredentials);
            }

            if !self.store.is_allowed(&user_name).await? {
                tracing::info!(user_name = %user_name, "User not on the allow-list");
                return Err(AuthError::NotAllowed);
            }

            registered = self.register(&user_name, &password).await?;
        }

        let user = match self.store.lookup_user(&user_name).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                return Err(AuthError::Internal(format!(
                    "User {user_name} vanished after successful authentication"
                )));
            }
            Err(e) => return Err(e),
        };

        let token = self.tokens.issue(&user.user_id, &user.user_name)?;
        tracing::info!(user_name = %user_name, user_id = %user.user_id, registered, "Token issued");

        Ok(AuthenticateOutput {
            token,
            user_id: user.user_id,
            registered,
        })
    }

    /// Returns whether this call created the record
    async fn register(&self, user_name: &UserName, password: &RawPassword) -> AuthResult<bool> {
        tracing::info!(user_name = %user_name, "Registering new user");

        let hash = self.store.hash_password(password).await?;
        match self.store.insert_user(user_name, &hash).await {
            Ok(user_id) => {
                tracing::info!(user_name = %user_name, user_id = %user_id, "User registered");
                Ok(true)
            }
            Err(AuthError::DuplicateUser) => {
                tracing::warn!(
                    user_name = %user_name,
                    "Concurrent registration, re-checking password"
                );
                if self.store.verify_password(user_name, password).await? {
                    Ok(false)
                } else {
                    Err(AuthError::DuplicateUser)
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::AuthConfig;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::user_password::UserPassword;
    use crate::infra::memory::InMemoryAuthRepository;
    use platform::password::HashingParams;

    const CHEAP: HashingParams = HashingParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    /// Lets another registration for the same name land between the
    /// existence check and the insert.
    struct RacingRepository {
        inner: InMemoryAuthRepository,
        rival_password: &'static str,
    }

    impl UserRepository for RacingRepository {
        async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
            self.inner.find_by_user_name(user_name).await
        }

        async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
            self.inner.exists_by_user_name(user_name).await
        }

        async fn create(
            &self,
            user_name: &UserName,
            password_hash: &UserPassword,
        ) -> AuthResult<UserId> {
            let rival = RawPassword::new(self.rival_password.to_string())
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            let rival_hash = UserPassword::from_raw(&rival, CHEAP).await?;
            self.inner.create(user_name, &rival_hash).await?;
            self.inner.create(user_name, password_hash).await
        }

        async fn upsert_password(
            &self,
            user_name: &UserName,
            password_hash: &UserPassword,
        ) -> AuthResult<UserId> {
            self.inner.upsert_password(user_name, password_hash).await
        }
    }

    impl AllowListRepository for RacingRepository {
        async fn is_allowed(&self, user_name: &UserName) -> AuthResult<bool> {
            self.inner.is_allowed(user_name).await
        }
    }

    fn use_case<R>(repo: R) -> AuthenticateUseCase<R>
    where
        R: UserRepository + AllowListRepository + Send + Sync + 'static,
    {
        let tokens = TokenIssuer::new(&AuthConfig::with_secret("test")).unwrap();
        AuthenticateUseCase::new(CredentialStore::new(Arc::new(repo), CHEAP), Arc::new(tokens))
    }

    fn input(username: &str, password: &str) -> AuthenticateInput {
        AuthenticateInput {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_lost_race_with_same_password_succeeds() {
        let uc = use_case(RacingRepository {
            inner: InMemoryAuthRepository::with_allowed(["alice"]),
            rival_password: "pw12",
        });

        let out = uc.execute(input("alice", "pw12")).await.unwrap();
        assert!(!out.registered);
    }

    #[tokio::test]
    async fn test_lost_race_with_other_password_conflicts() {
        let uc = use_case(RacingRepository {
            inner: InMemoryAuthRepository::with_allowed(["alice"]),
            rival_password: "other-pw",
        });

        assert!(matches!(
            uc.execute(input("alice", "pw12")).await,
            Err(AuthError::DuplicateUser)
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repo = InMemoryAuthRepository::with_allowed(["alice"]);
        let uc = use_case(repo.clone());

        let first = uc.execute(input("alice", "pw12")).await.unwrap();
        assert!(first.registered);
        let second = uc.execute(input("alice", "pw12")).await.unwrap();
        assert!(!second.registered);
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_validation_precedes_store_access() {
        let repo = InMemoryAuthRepository::new();
        repo.set_unavailable(true);
        let uc = use_case(repo);

        let result = uc
            .execute(AuthenticateInput {
                username: None,
                password: Some("x".into()),
            })
            .await;
        match result {
            Err(AuthError::Validation(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
