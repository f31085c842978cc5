//! Core logic for the log service
//!
//! Every operation validates the caller's token first; auth and validation
//! failures return before anything is written.

mod certificates;
mod ingest;
mod query;

pub use certificates::{CertificateDownload, CertificateService};
pub use ingest::IngestionService;
pub use query::{LogSummary, QueryService};

use hipot_core::{BlobError, RenderError, ValidationError};
use hipot_gate::AuthError;
use thiserror::Error;

use crate::storage::StorageError;

/// Failure of a service operation
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// A stored certificate cannot be turned back into PDF bytes
    #[error("Stored certificate for log {id} is unreadable: {source}")]
    Certificate { id: i64, source: BlobError },
}
