//! Change Password Use Case
//!
//! Sets a new password for an account, creating it when absent. The
//! caller is identified by the validated token claims.

use crate::application::credential_store::CredentialStore;
use crate::application::token::Claims;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::domain::value_object::credentials::Credentials;
use crate::error::{AuthError, AuthResult};

/// Body field carrying the new password
pub const NEW_PASSWORD_FIELD: &str = "newPassword";

/// Change password input
pub struct ChangePasswordInput {
    pub username: Option<String>,
    pub new_password: Option<String>,
}

/// Change password use case
pub struct ChangePasswordUseCase<R> {
    store: CredentialStore<R>,
    bind_to_subject: bool,
}

impl<R> ChangePasswordUseCase<R>
where
    R: UserRepository + AllowListRepository + Send + Sync + 'static,
{
    pub fn new(store: CredentialStore<R>, bind_to_subject: bool) -> Self {
        Self {
            store,
            bind_to_subject,
        }
    }

    pub async fn execute(&self, input: ChangePasswordInput, caller: &Claims) -> AuthResult<()> {
        let Credentials {
            user_name,
            password,
        } = Credentials::parse(input.username, input.new_password, NEW_PASSWORD_FIELD)
            .map_err(AuthError::Validation)?;

        if self.bind_to_subject && caller.username != user_name.as_str() {
            tracing::warn!(
                caller = %caller.username,
                target = %user_name,
                "Password change for another account refused"
            );
            return Err(AuthError::SubjectMismatch);
        }

        tracing::info!(user_name = %user_name, caller = %caller.username, "Changing password");

        let hash = self.store.hash_password(&password).await?;
        let user_id = self.store.update_password(&user_name, &hash).await?;

        tracing::info!(user_name = %user_name, user_id = %user_id, "Password changed");
        Ok(())
    }
}
