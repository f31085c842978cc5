//! Work order ingestion

use std::sync::Arc;
use tracing::info;

use hipot_core::{validate_submission, AuditRecord, WorkOrderPayload};
use hipot_gate::{AuthGate, Principal};

use super::ServiceError;
use crate::storage::AuditStore;

/// Validates submissions and stores one record per serial number
#[derive(Debug, Clone)]
pub struct IngestionService {
    gate: AuthGate,
    store: Arc<dyn AuditStore>,
}

impl IngestionService {
    pub fn new(gate: AuthGate, store: Arc<dyn AuditStore>) -> Self {
        Self { gate, store }
    }

    /// Authenticate, validate, then store the whole submission atomically
    pub async fn submit(
        &self,
        token: Option<&str>,
        payload: WorkOrderPayload,
    ) -> Result<Vec<AuditRecord>, ServiceError> {
        let principal = self.gate.validate_token(token)?;
        self.submit_as(&principal, payload).await
    }

    /// Store a submission for an already authenticated caller
    pub async fn submit_as(
        &self,
        principal: &Principal,
        payload: WorkOrderPayload,
    ) -> Result<Vec<AuditRecord>, ServiceError> {
        let submission = validate_submission(payload)?;
        let records = submission.fan_out();

        let saved = self.store.insert_batch(records).await?;

        info!(
            user = %principal.username,
            work_order = %submission.work_order.work_order_number,
            saved = saved.len(),
            certificate_len = submission.pdf_data.len(),
            "Work order stored"
        );
        Ok(saved)
    }
}
