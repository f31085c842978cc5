//! AuthGate - password login and bearer token checks

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password, DEFAULT_COST};
use crate::store::CredentialStore;
use crate::token::TokenSigner;
use crate::types::{IssuedToken, Principal};

/// Issues tokens for valid logins and validates them on every request
#[derive(Debug, Clone)]
pub struct AuthGate {
    credentials: Arc<dyn CredentialStore>,
    signer: TokenSigner,
    bcrypt_cost: u32,
}

impl AuthGate {
    pub fn new(credentials: Arc<dyn CredentialStore>, signer: TokenSigner) -> Self {
        Self {
            credentials,
            signer,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Set the bcrypt cost used for newly created accounts
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Exchange a username and password for a bearer token
    ///
    /// Unknown users and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn issue_token(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let Some(user) = self.credentials.find_user(username).await? else {
            warn!(username = %username, "Login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!(username = %username, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.signer.issue(&user)?;
        info!(
            user_id = user.id,
            username = %user.username,
            expires_at = %issued.expires_at,
            "Login succeeded"
        );
        Ok(issued)
    }

    /// Check the bearer token of a request
    ///
    /// Pure function of the token and the signing secret.
    pub fn validate_token(&self, token: Option<&str>) -> Result<Principal> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::NoToken),
        };

        self.signer.verify(token).map_err(|e| {
            warn!(error = %e, "Token rejected");
            e
        })
    }

    /// Create the bootstrap account unless it already exists
    ///
    /// Returns `true` when the account was created.
    pub async fn seed_default_user(&self, username: &str, password: &str) -> Result<bool> {
        if self.credentials.find_user(username).await?.is_some() {
            return Ok(false);
        }

        let hash = hash_password(password, self.bcrypt_cost).await?;
        match self.credentials.create_user(username, &hash).await {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "Default user created");
                Ok(true)
            }
            // another instance seeded it first
            Err(AuthError::UserExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}
