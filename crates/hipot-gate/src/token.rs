//! HS256 token signing and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::error::Result;
use crate::types::{Claims, IssuedToken, Principal, UserRecord};

/// Fixed validity window of every issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Signs and verifies bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is exact; no grace period
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user`, valid for [`TOKEN_TTL_HOURS`] from now
    pub fn issue(&self, user: &UserRecord) -> Result<IssuedToken> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it were `issued_at`
    pub fn issue_at(&self, user: &UserRecord, issued_at: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = issued_at + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(user_id = user.id, expires_at = %expires_at, "Token issued");

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry; no other state is consulted
    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(Principal::from(data.claims))
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_hours", &TOKEN_TTL_HOURS)
            .finish_non_exhaustive()
    }
}
