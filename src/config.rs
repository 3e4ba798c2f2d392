//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! The only built-in secret is a development fallback, which is rejected
//! when running in production.

use crate::error::AuthError;
use axum::http::HeaderValue;
use std::env;

/// Signing secret used when `JWT_SECRET` is unset outside production
pub const DEV_JWT_SECRET: &str = "dev_secret_change_me_for_local_use_only";

/// Seven days, in seconds
pub const DEFAULT_SESSION_TTL: i64 = 7 * 24 * 3600;

/// Upper bound on SESSION_TTL: one year, in seconds
pub const MAX_SESSION_TTL: i64 = 365 * 24 * 3600;

/// Deployment environment (from APP_ENV, falling back to NODE_ENV)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// `APP_ENV` wins over `NODE_ENV`; neither set means development
    fn resolve(app_env: Option<String>, node_env: Option<String>) -> Self {
        app_env
            .or(node_env)
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development)
    }
}

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Deployment environment (from APP_ENV or NODE_ENV env var)
    pub environment: Environment,

    /// HTTP listen port (from PORT env var)
    pub port: u16,

    /// Origin allowed to make credentialed requests (from CLIENT_ORIGIN env var)
    pub client_origin: String,

    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Session token lifetime in seconds (from SESSION_TTL env var)
    pub session_ttl: i64,

    /// Name of the session cookie (from SESSION_COOKIE_NAME env var)
    pub cookie_name: String,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment =
            Environment::resolve(env::var("APP_ENV").ok(), env::var("NODE_ENV").ok());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            DEV_JWT_SECRET.to_string()
        });

        Self {
            environment,

            port: parse_env("PORT").unwrap_or(5000),

            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            jwt_secret,

            session_ttl: parse_env("SESSION_TTL").unwrap_or(DEFAULT_SESSION_TTL),

            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "token".to_string()),

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "session-auth".to_string()),

            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "session-auth-web".to_string()),

            argon2_memory_cost: parse_env("ARGON2_MEMORY_COST").unwrap_or(19456), // 19 MiB

            argon2_time_cost: parse_env("ARGON2_TIME_COST").unwrap_or(2),

            argon2_parallelism: parse_env("ARGON2_PARALLELISM").unwrap_or(1),
        }
    }

    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Argon2 parameters for the configured work factor
    pub fn argon2_params(&self) -> Result<argon2::Params, AuthError> {
        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.environment == Environment::Production && self.jwt_secret == DEV_JWT_SECRET {
            return Err(AuthError::Config(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }

        if self.session_ttl <= 0 || self.session_ttl > MAX_SESSION_TTL {
            return Err(AuthError::Config(format!(
                "SESSION_TTL must be between 1 and {} seconds",
                MAX_SESSION_TTL
            )));
        }

        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AuthError::Config(
                "SESSION_COOKIE_NAME must be a non-empty token".to_string(),
            ));
        }

        if HeaderValue::from_str(&self.client_origin).is_err() {
            return Err(AuthError::Config(
                "CLIENT_ORIGIN is not a valid origin".to_string(),
            ));
        }

        self.argon2_params()?;

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        environment: Environment::Development,
        port: 5000,
        client_origin: "http://localhost:5173".to_string(),
        jwt_secret: "a".repeat(32),
        session_ttl: DEFAULT_SESSION_TTL,
        cookie_name: "token".to_string(),
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        // Cheap parameters keep hashing fast in tests
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}
