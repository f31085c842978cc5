//! Access Gate
//!
//! Issues and validates the bearer tokens that guard every log operation.
//!
//! ## Model
//!
//! - **Credential**: a username with a bcrypt password hash, held by a
//!   [`CredentialStore`]
//! - **Token**: an HS256 JWT carrying the user's id and name, valid for
//!   24 hours from issue. Tokens are self-contained; there is no session
//!   table and no revocation.
//! - **Principal**: the identity recovered from a valid token
//!
//! ## Token lifecycle
//!
//! ```text
//! Unissued --issue_token--> Valid --24h--> Expired (rejected from then on)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use hipot_gate::{AuthGate, InMemoryCredentialStore, TokenSigner};
//!
//! let gate = AuthGate::new(
//!     Arc::new(InMemoryCredentialStore::new()),
//!     TokenSigner::new(b"secret"),
//! );
//! gate.seed_default_user("admin", "admin").await?;
//!
//! let issued = gate.issue_token("admin", "admin").await?;
//! let principal = gate.validate_token(Some(&issued.token))?;
//! ```

pub mod error;
pub mod gate;
pub mod password;
pub mod store;
pub mod token;
pub mod types;

pub use error::{AuthError, Result};
pub use gate::AuthGate;
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use token::{TokenSigner, TOKEN_TTL_HOURS};
pub use types::{Claims, IssuedToken, Principal, UserRecord};
