//! Credential Store
//!
//! Registration, password verification and user lookup on top of a
//! [`UserRepository`]. Passwords are hashed with Argon2id using the
//! configured, fixed work factor.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::User;
use crate::repository::UserRepository;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Version,
};
use rand::Rng;
use std::sync::Arc;

/// Authoritative set of users plus the password hashing policy
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
    argon2: Argon2<'static>,
    /// Verified against when the email is unknown, so that both failure
    /// paths pay the same hashing cost.
    dummy_hash: String,
}

impl CredentialStore {
    /// Create a credential store over the given repository
    pub fn new(repo: Arc<dyn UserRepository>, config: &AuthConfig) -> Result<Self, AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, config.argon2_params()?);

        let filler: [u8; 32] = rand::thread_rng().gen();
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2.hash_password(&filler, &salt)?.to_string();

        Ok(Self {
            repo,
            argon2,
            dummy_hash,
        })
    }

    /// Get reference to the underlying repository
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repo
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a PHC hash string
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Internal)?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    // ============================================
    // Store Operations
    // ============================================

    /// Register a new user
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Cheap early rejection; the repository re-checks under its write lock
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hash_password(password)?;
        let user = self.repo.insert(email, password_hash).await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check an email/password pair
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            self.verify_password(password, &self.dummy_hash)?;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<User, AuthError> {
        self.repo.find_by_id(id).await?.ok_or(AuthError::UserNotFound)
    }
}
