//! Hi-Pot Test Log Server
//!
//! Stores Hi-Pot / Ground-Bond test results per tested unit, together with
//! the certificate rendered for the work order, behind bearer-token access.
//!
//! ## Pipeline
//!
//! ingestion -> validation -> certificate -> persistence -> query
//!
//! A work order with *k* serial numbers becomes *k* audit records sharing
//! the work order fields and certificate, written in one transaction.
//!
//! ## API Endpoints
//!
//! - `GET /` - Liveness check
//! - `POST /api/auth/login` - Exchange username and password for a token
//! - `POST /api/logs` - Store a work order
//! - `GET /api/logs` - List records, newest first
//! - `GET /api/logs/summary` - Record count and records without certificates
//! - `GET /api/logs/{id}` - One record
//! - `DELETE /api/logs/{id}` - Delete one record
//! - `GET /api/logs/{id}/certificate` - Stored certificate as a PDF download
//! - `POST /api/certificates/render` - Render a certificate without storing it

pub mod api;
pub mod config;
pub mod core;
pub mod startup;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, DatabaseBackend, ServerConfig};
pub use startup::{build_state, StartupError};
pub use storage::{AuditStore, MemoryStore, StorageError};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
