//! Storage abstraction for audit records
//!
//! One row per tested serial number. Rows are append-only; the only
//! mutation after insert is deletion by id. Two backends exist:
//! - [`MemoryStore`], always available, lost on restart
//! - [`SqliteStore`] (feature `sqlite`), durable, also holds login accounts

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use hipot_core::{AuditRecord, NewAuditRecord};
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Log not found: {0}")]
    NotFound(i64),

    /// An insert failed; nothing from the batch was kept
    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Storage backend trait for audit records
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait AuditStore: Send + Sync + Debug {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Store one record, assigning its id and creation time
    async fn insert(&self, record: NewAuditRecord) -> Result<AuditRecord, StorageError> {
        let mut saved = self.insert_batch(vec![record]).await?;
        saved
            .pop()
            .ok_or_else(|| StorageError::WriteFailure("insert returned no row".into()))
    }

    /// Store every record or none of them
    ///
    /// All records of a batch share one creation time. Ids are assigned in
    /// input order.
    async fn insert_batch(
        &self,
        records: Vec<NewAuditRecord>,
    ) -> Result<Vec<AuditRecord>, StorageError>;

    /// Delete one record; [`StorageError::NotFound`] when no row has `id`
    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError>;

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every record, newest first (ties broken by descending id)
    async fn list(&self) -> Result<Vec<AuditRecord>, StorageError>;

    async fn get(&self, id: i64) -> Result<Option<AuditRecord>, StorageError>;

    async fn count(&self) -> Result<usize, StorageError>;
}

/// Current time at the millisecond precision every backend persists
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}

/// Newest first, then highest id first
pub(crate) fn newest_first(a: &AuditRecord, b: &AuditRecord) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}
