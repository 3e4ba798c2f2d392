//! Authentication Service
//!
//! Register, login, identity check and logout flows composed from the
//! credential store and the session authority.

use crate::config::AuthConfig;
use crate::cookie::CookieDirectives;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::models::*;
use crate::repository::{InMemoryUserRepository, UserRepository};
use crate::session::{IssuedSession, SessionAuthority};

use std::sync::Arc;
use validator::Validate;

/// Authentication service
pub struct AuthService {
    config: AuthConfig,
    credentials: CredentialStore,
    sessions: SessionAuthority,
}

impl AuthService {
    /// Create a new authentication service over the given user repository
    pub fn new(config: AuthConfig, repo: Arc<dyn UserRepository>) -> Result<Self, AuthError> {
        config.validate()?;

        let credentials = CredentialStore::new(repo, &config)?;
        let sessions = SessionAuthority::new(&config)?;

        Ok(Self {
            config,
            credentials,
            sessions,
        })
    }

    /// Create a service backed by a fresh in-memory store
    pub fn in_memory(config: AuthConfig) -> Result<Self, AuthError> {
        Self::new(config, Arc::new(InMemoryUserRepository::new()))
    }

    /// Get reference to config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    // ============================================
    // User Registration
    // ============================================

    /// Register a new user and log them in with a persistent cookie
    pub async fn register(
        &self,
        req: RegisterRequest,
    ) -> Result<(User, IssuedSession), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let user = self.credentials.register(&req.email, &req.password).await?;
        let session = self.sessions.issue(user.id, &user.email, true)?;

        Ok((user, session))
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Check credentials and issue a session
    pub async fn login(&self, req: LoginRequest) -> Result<(User, IssuedSession), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let user = self.credentials.verify(&req.email, &req.password).await?;
        let session = self.sessions.issue(user.id, &user.email, req.remember)?;

        tracing::info!(user_id = user.id, remember = req.remember, "User logged in");

        Ok((user, session))
    }

    /// Resolve a session token to the user it names.
    ///
    /// The user is looked up again because it may be gone since issuance.
    pub async fn current_user(&self, token: Option<&str>) -> Result<User, AuthError> {
        let claims = self.sessions.verify(token)?;
        self.credentials.find_by_id(claims.user_id()).await
    }

    /// Cookie directive that logs the client out
    pub fn logout(&self) -> CookieDirectives {
        self.sessions.revoke()
    }
}
