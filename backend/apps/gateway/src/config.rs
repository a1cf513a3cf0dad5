//! Gateway Configuration
//!
//! Everything the binary reads from the environment, parsed once at
//! startup.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use auth::AuthConfig;
use auth::config::DEVELOPMENT_JWT_SECRET;
use platform::config::{ConfigError, Env};
use platform::password::HashingParams;
use platform::tls::TlsFiles;

/// Longest accepted token lifetime (one year)
const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Plain HTTP
    Dev,
    /// HTTPS with the configured certificate
    Prod,
}

impl Environment {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(ConfigError::Invalid {
                name: "ENV",
                reason: format!("expected dev or prod, got {other:?}"),
            }),
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub port: u16,
    /// Port clients reach the service on (for logs only)
    pub exposed_port: u16,
    pub environment: Environment,
    /// Present exactly when `environment` is `Prod`
    pub tls: Option<TlsFiles>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: String,
    pub auth: AuthConfig,
}

impl GatewayConfig {
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let port = env.parse_or("PORT", 9000u16)?;
        let exposed_port = env.parse_or("EXPOSED_PORT", port)?;
        let environment = Environment::parse(&env.string_or("ENV", "dev"))?;

        let tls = match environment {
            Environment::Dev => None,
            Environment::Prod => Some(TlsFiles {
                key: PathBuf::from(env.required("SSL_KEY_FILE")?),
                cert: PathBuf::from(env.required("SSL_CRT_FILE")?),
                chain: PathBuf::from(env.required("SSL_CHN_FILE")?),
            }),
        };

        let jwt_secret = match environment {
            Environment::Dev => env.string_or("JWT_KEY", DEVELOPMENT_JWT_SECRET),
            Environment::Prod => env.required("JWT_KEY")?,
        };

        let token_context = match env.optional("TOKEN_CONTEXT") {
            None => serde_json::Value::Object(Default::default()),
            Some(raw) => parse_token_context(&raw)?,
        };

        let ttl_hours: u64 = env.parse_or("TOKEN_TTL_HOURS", 12)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            });
        }

        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: env.parse_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env.parse_or("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: env.parse_or("ARGON2_PARALLELISM", defaults.parallelism)?,
        };
        hashing.validate().map_err(|e| ConfigError::Invalid {
            name: "ARGON2_*",
            reason: e.to_string(),
        })?;

        Ok(Self {
            port,
            exposed_port,
            environment,
            tls,
            database_url: env.required("DATABASE_URL")?,
            database_max_connections: env.parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            log_level: env.string_or("LOG_LEVEL", "debug"),
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::from_secs(ttl_hours * 3600),
                token_context,
                hashing,
                bind_password_change_to_subject: env
                    .flag_or("PASSWORD_CHANGE_BINDS_SUBJECT", true)?,
            },
        })
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> String {
        let level = &self.log_level;
        format!("gateway={level},auth={level},platform={level},tower_http=info")
    }
}

fn parse_token_context(raw: &str) -> Result<serde_json::Value, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
            name: "TOKEN_CONTEXT",
            reason: e.to_string(),
        })?;

    if !value.is_object() {
        return Err(ConfigError::Invalid {
            name: "TOKEN_CONTEXT",
            reason: "must be a JSON object".to_string(),
        });
    }
    Ok(value)
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("exposed_port", &self.exposed_port)
            .field("environment", &self.environment)
            .field("tls", &self.tls)
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("log_level", &self.log_level)
            .field("auth", &self.auth)
            .finish()
    }
}
