//! Certificate rendering and download

use std::sync::Arc;
use tracing::debug;

use hipot_core::{
    decode_data_url, render_certificate, validate_work_order, Certificate, WorkOrderPayload,
};
use hipot_gate::{AuthGate, Principal};

use super::ServiceError;
use crate::storage::{AuditStore, StorageError};

/// PDF bytes of a stored certificate plus a download name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renders certificates on request and serves stored ones
#[derive(Debug, Clone)]
pub struct CertificateService {
    gate: AuthGate,
    store: Arc<dyn AuditStore>,
}

impl CertificateService {
    pub fn new(gate: AuthGate, store: Arc<dyn AuditStore>) -> Self {
        Self { gate, store }
    }

    /// Render the certificate for a work order without storing anything
    pub fn render(
        &self,
        token: Option<&str>,
        payload: WorkOrderPayload,
    ) -> Result<Certificate, ServiceError> {
        let principal = self.gate.validate_token(token)?;
        self.render_for(&principal, payload)
    }

    /// Render for an already authenticated caller
    pub fn render_for(
        &self,
        principal: &Principal,
        payload: WorkOrderPayload,
    ) -> Result<Certificate, ServiceError> {
        let order = validate_work_order(payload)?;
        let certificate = render_certificate(&order)?;
        debug!(
            user = %principal.username,
            work_order = %order.work_order_number,
            "Certificate rendered on request"
        );
        Ok(certificate)
    }

    /// Decode the certificate stored with a log record
    pub async fn download(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<CertificateDownload, ServiceError> {
        self.gate.validate_token(token)?;
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(ServiceError::Storage(StorageError::NotFound(id)))?;

        let decoded = decode_data_url(&record.pdf_data)
            .map_err(|source| ServiceError::Certificate { id, source })?;
        debug!(id = id, size = decoded.bytes.len(), "Serving stored certificate");

        Ok(CertificateDownload {
            filename: download_name(&record.work_order_number),
            bytes: decoded.bytes,
        })
    }
}

/// `work-order-<number>.pdf`, restricted to filename-safe characters
fn download_name(work_order_number: &str) -> String {
    let safe: String = work_order_number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("work-order-{safe}.pdf")
}
