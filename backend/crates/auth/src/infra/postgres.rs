//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{AllowListRepository, UserRepository};
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and check that the database answers
    pub async fn connect(database_url: &str, max_connections: u32) -> AuthResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(AuthError::store("connect", "database"))?;

        tracing::info!(max_connections, "Connected to credential store");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                password_hash,
                created_at,
                updated_at
            FROM users
            WHERE user_name = $1
            "#,
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AuthError::store("lookup_user", user_name))?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_name = $1)")
                .bind(user_name.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(AuthError::store("user_exists", user_name))?;

        Ok(exists)
    }

    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (user_id, user_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id
            "#,
        )
        .bind(UserId::new().into_uuid())
        .bind(user_name.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(UserId::from_uuid(id)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::DuplicateUser)
            }
            Err(e) => Err(AuthError::store("insert_user", user_name)(e)),
        }
    }

    async fn upsert_password(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
    ) -> AuthResult<UserId> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (user_id, user_name, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_name) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                updated_at = now()
            RETURNING user_id
            "#,
        )
        .bind(UserId::new().into_uuid())
        .bind(user_name.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AuthError::store("update_password", user_name))?;

        Ok(UserId::from_uuid(id))
    }
}

// ============================================================================
// Allow-List Repository Implementation
// ============================================================================

impl AllowListRepository for PgAuthRepository {
    async fn is_allowed(&self, user_name: &UserName) -> AuthResult<bool> {
        let allowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM allowed_users WHERE user_name = $1)",
        )
        .bind(user_name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AuthError::store("is_allowed", user_name))?;

        Ok(allowed)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_db(self.password_hash).map_err(|e| {
            AuthError::Internal(format!("Invalid password hash for {}: {e}", self.user_name))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
