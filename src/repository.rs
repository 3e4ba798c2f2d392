//! User Repository
//!
//! Storage seam for user records. The in-memory implementation is volatile:
//! everything is lost when the process exits.

use crate::error::AuthError;
use crate::models::{normalize_email, User};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage for user records keyed by normalized email
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, assigning the next identifier.
    ///
    /// The uniqueness check and the insert happen atomically: of several
    /// concurrent inserts for the same normalized email at most one succeeds,
    /// the rest fail with [`AuthError::EmailExists`].
    async fn insert(&self, email: &str, password_hash: String) -> Result<User, AuthError>;

    /// Find a user by email, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Find a user by identifier
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;

    /// Number of stored users
    async fn count(&self) -> Result<usize, AuthError>;
}

#[derive(Debug)]
struct Records {
    next_id: i64,
    by_email: HashMap<String, User>,
    email_by_id: HashMap<i64, String>,
}

/// Volatile in-process user store
#[derive(Debug)]
pub struct InMemoryUserRepository {
    records: RwLock<Records>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records {
                next_id: 1,
                by_email: HashMap::new(),
                email_by_id: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, email: &str, password_hash: String) -> Result<User, AuthError> {
        let key = normalize_email(email);
        let mut records = self.records.write().await;

        if records.by_email.contains_key(&key) {
            return Err(AuthError::EmailExists);
        }

        let user = User {
            id: records.next_id,
            email: email.trim().to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        records.next_id += 1;
        records.email_by_id.insert(user.id, key.clone());
        records.by_email.insert(key, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let records = self.records.read().await;
        Ok(records.by_email.get(&normalize_email(email)).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let records = self.records.read().await;
        Ok(records
            .email_by_id
            .get(&id)
            .and_then(|key| records.by_email.get(key))
            .cloned())
    }

    async fn count(&self) -> Result<usize, AuthError> {
        Ok(self.records.read().await.by_email.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryUserRepository::new();
        let first = assert_ok!(repo.insert("a@example.com", "h1".into()).await);
        let second = assert_ok!(repo.insert("b@example.com", "h2".into()).await);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        assert_ok!(repo.insert("A@x.com", "h".into()).await);

        let err = assert_err!(repo.insert("a@x.com", "h".into()).await);
        assert_eq!(err, AuthError::EmailExists);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_id() {
        let repo = InMemoryUserRepository::new();
        let user = repo.insert("Bob@Example.com", "h".into()).await.unwrap();

        let by_email = repo.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.email, "Bob@Example.com");

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, user.email);

        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_have_one_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                let email = if i % 2 == 0 { "race@example.com" } else { "RACE@example.com" };
                tokio::spawn(async move { repo.insert(email, format!("h{}", i)).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
