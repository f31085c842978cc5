//! Credential storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use crate::error::{AuthError, Result};
use crate::types::UserRecord;

/// Backend holding login accounts
///
/// Implement this trait to keep users next to the rest of the data, e.g.
/// in the same database as the audit log.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Look up an account by exact username
    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Create an account; fails with [`AuthError::UserExists`] on a taken name
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord>;
}

/// In-memory credential store for tests and development
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self
            .users
            .read()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        Ok(users.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord> {
        let mut users = self
            .users
            .write()
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        if users.contains_key(username) {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let user = UserRecord {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }
}
