//! Access-controlled reads and deletes

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use hipot_core::{AuditRecord, AuditSummary};
use hipot_gate::AuthGate;

use super::ServiceError;
use crate::storage::{AuditStore, StorageError};

/// Record listing without certificate bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub logs: Vec<AuditSummary>,
}

/// List, fetch and delete audit records under a valid token
///
/// Filtering is left to callers; see [`AuditRecord::matches_query`].
#[derive(Debug, Clone)]
pub struct QueryService {
    gate: AuthGate,
    store: Arc<dyn AuditStore>,
}

impl QueryService {
    pub fn new(gate: AuthGate, store: Arc<dyn AuditStore>) -> Self {
        Self { gate, store }
    }

    /// Every record, newest first
    pub async fn list(&self, token: Option<&str>) -> Result<Vec<AuditRecord>, ServiceError> {
        self.gate.validate_token(token)?;
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, token: Option<&str>, id: i64) -> Result<AuditRecord, ServiceError> {
        self.gate.validate_token(token)?;
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::Storage(StorageError::NotFound(id)))
    }

    pub async fn delete(&self, token: Option<&str>, id: i64) -> Result<(), ServiceError> {
        let principal = self.gate.validate_token(token)?;
        self.store.delete_by_id(id).await?;
        info!(id = id, user = %principal.username, "Log deleted");
        Ok(())
    }

    pub async fn summary(&self, token: Option<&str>) -> Result<LogSummary, ServiceError> {
        self.gate.validate_token(token)?;
        let logs: Vec<AuditSummary> = self
            .store
            .list()
            .await?
            .iter()
            .map(AuditRecord::summary)
            .collect();

        Ok(LogSummary {
            total: logs.len(),
            logs,
        })
    }
}
