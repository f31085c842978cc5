//! In-memory storage backend
//!
//! Suitable for development and tests. Data is lost on restart.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use hipot_core::{AuditRecord, NewAuditRecord};

use super::{newest_first, now_millis, AuditStore, StorageError};

#[derive(Debug)]
struct Inner {
    records: BTreeMap<i64, AuditRecord>,
    /// Ids are never reused, even after deletion
    next_id: i64,
}

/// In-memory audit store implementation
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StorageError> {
        self.inner
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StorageError> {
        self.inner
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn insert_batch(
        &self,
        records: Vec<NewAuditRecord>,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        let mut inner = self.write()?;
        let created_at = now_millis();

        let saved: Vec<AuditRecord> = records
            .into_iter()
            .enumerate()
            .map(|(offset, record)| record.into_record(inner.next_id + offset as i64, created_at))
            .collect();

        inner.next_id += saved.len() as i64;
        for record in &saved {
            inner.records.insert(record.id, record.clone());
        }

        info!(rows = saved.len(), "Stored audit records");
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.write()?;
        match inner.records.remove(&id) {
            Some(_) => {
                info!(id = id, "Deleted audit record");
                Ok(())
            }
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn list(&self) -> Result<Vec<AuditRecord>, StorageError> {
        let inner = self.read()?;
        let mut records: Vec<AuditRecord> = inner.records.values().cloned().collect();
        records.sort_by(newest_first);
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<AuditRecord>, StorageError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.records.len())
    }
}
