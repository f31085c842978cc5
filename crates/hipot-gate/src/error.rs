//! Error types for the access gate

use thiserror::Error;

/// Result type for access gate operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while authenticating a caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was supplied
    #[error("Access token required")]
    NoToken,

    /// The token was valid once but its 24 hour window has passed
    #[error("Token expired")]
    Expired,

    /// Bad signature, malformed token or unexpected claims
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Unknown username or wrong password; the two are not distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with this name already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// The credential store or password hasher failed
    #[error("Authentication backend error: {0}")]
    Backend(String),
}

impl AuthError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::NoToken => "NO_TOKEN",
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::Invalid(_) => "INVALID_TOKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::UserExists(_) => "USER_EXISTS",
            AuthError::Backend(_) => "AUTH_BACKEND_ERROR",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AuthError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(AuthError::NoToken.code(), "NO_TOKEN");
        assert_eq!(AuthError::Expired.code(), "TOKEN_EXPIRED");
        assert_eq!(AuthError::Invalid("x".into()).code(), "INVALID_TOKEN");
        assert_eq!(AuthError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
    }

    #[test]
    fn test_jwt_expiry_maps_to_expired() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert_eq!(AuthError::from(err), AuthError::Expired);

        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidSignature,
        );
        assert!(matches!(AuthError::from(err), AuthError::Invalid(_)));
    }
}
