//! bcrypt password hashing
//!
//! Hashing is deliberately slow, so both operations run on the blocking
//! thread pool.

use crate::error::{AuthError, Result};

pub const DEFAULT_COST: u32 = 10;

pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Backend(e.to_string()))?
        .map_err(AuthError::from)
}

/// `Ok(false)` for a wrong password; `Err` only when the hash is unusable
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Backend(e.to_string()))?
        .map_err(AuthError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("admin", 4).await.unwrap();
        assert_ne!(hash, "admin");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("admin", &hash).await.unwrap());
        assert!(!verify_password("Admin", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salted() {
        let a = hash_password("admin", 4).await.unwrap();
        let b = hash_password("admin", 4).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_backend_error() {
        let result = verify_password("admin", "plaintext").await;
        assert!(matches!(result, Err(AuthError::Backend(_))));
    }
}
