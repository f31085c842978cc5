//! Service assembly: storage backend, access gate and default account

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use hipot_gate::{AuthError, AuthGate, CredentialStore, InMemoryCredentialStore, TokenSigner};

use crate::api::handlers::AppState;
use crate::config::{DatabaseBackend, ServerConfig};
use crate::storage::{AuditStore, MemoryStore, StorageError};

/// Reasons the service cannot start
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Seeding default user failed: {0}")]
    Seed(#[from] AuthError),

    #[error("Backend '{0}' is not compiled in")]
    BackendUnavailable(&'static str),
}

async fn open_stores(
    database: &DatabaseBackend,
) -> Result<(Arc<dyn AuditStore>, Arc<dyn CredentialStore>), StartupError> {
    match database {
        DatabaseBackend::Memory => {
            warn!("Using in-memory storage; logs are lost on restart");
            let audit: Arc<dyn AuditStore> = Arc::new(MemoryStore::new());
            let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
            Ok((audit, credentials))
        }
        #[cfg(feature = "sqlite")]
        DatabaseBackend::Sqlite(url) => {
            let store = Arc::new(crate::storage::SqliteStore::new(url).await?);
            let audit: Arc<dyn AuditStore> = store.clone();
            let credentials: Arc<dyn CredentialStore> = store;
            Ok((audit, credentials))
        }
        #[cfg(not(feature = "sqlite"))]
        DatabaseBackend::Sqlite(_) => Err(StartupError::BackendUnavailable("sqlite")),
    }
}

/// Open storage, build the gate and make sure the default account exists
pub async fn build_state(config: ServerConfig) -> Result<Arc<AppState>, StartupError> {
    let (store, credentials) = open_stores(&config.database).await?;

    if !config.jwt_secret_configured {
        warn!("HIPOT_JWT_SECRET not set; tokens will not survive a restart");
    }

    let gate = AuthGate::new(credentials, TokenSigner::new(&config.jwt_secret))
        .with_bcrypt_cost(config.bcrypt_cost);

    if gate
        .seed_default_user(&config.admin_username, &config.admin_password)
        .await?
    {
        info!(username = %config.admin_username, "Seeded default account");
    }

    Ok(Arc::new(AppState::new(gate, store, config)))
}
