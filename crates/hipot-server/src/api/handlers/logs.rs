//! Audit log handlers
//!
//! Every route here requires a bearer token.

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use hipot_core::{AuditRecord, WorkOrderPayload, PDF_MEDIA_TYPE};

use crate::api::error::ApiError;
use crate::api::handlers::{bearer_token, log_id, AppState};
use crate::core::LogSummary;

/// One stored row of a submission
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEntry {
    pub id: i64,
    pub serial_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogsResponse {
    pub success: bool,
    pub results: Vec<SavedEntry>,
    pub saved_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListLogsResponse {
    pub success: bool,
    pub logs: Vec<AuditRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetLogResponse {
    pub success: bool,
    pub log: AuditRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteLogResponse {
    pub success: bool,
}

/// Store a work order, one row per serial number
///
/// POST /api/logs
pub async fn create_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WorkOrderPayload>, JsonRejection>,
) -> Result<Json<CreateLogsResponse>, ApiError> {
    // token first, so an anonymous caller learns nothing about the payload
    let principal = state.gate.validate_token(bearer_token(&headers))?;
    let Json(payload) = payload?;

    let saved = state.ingestion.submit_as(&principal, payload).await?;

    Ok(Json(CreateLogsResponse {
        success: true,
        saved_count: saved.len(),
        results: saved
            .into_iter()
            .map(|r| SavedEntry {
                id: r.id,
                serial_number: r.serial_number,
            })
            .collect(),
    }))
}

/// List every record, newest first
///
/// GET /api/logs
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ListLogsResponse>, ApiError> {
    let logs = state.query.list(bearer_token(&headers)).await?;
    Ok(Json(ListLogsResponse {
        success: true,
        logs,
    }))
}

/// Record count and records without certificate bodies
///
/// GET /api/logs/summary
pub async fn log_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LogSummary>, ApiError> {
    Ok(Json(state.query.summary(bearer_token(&headers)).await?))
}

/// GET /api/logs/{id}
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<GetLogResponse>, ApiError> {
    let token = bearer_token(&headers);
    let id = log_id(&state, token, id)?;
    let log = state.query.get(token, id).await?;
    Ok(Json(GetLogResponse { success: true, log }))
}

/// DELETE /api/logs/{id}
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteLogResponse>, ApiError> {
    let token = bearer_token(&headers);
    let id = log_id(&state, token, id)?;
    state.query.delete(token, id).await?;
    Ok(Json(DeleteLogResponse { success: true }))
}

/// Download the stored certificate as a PDF attachment
///
/// GET /api/logs/{id}/certificate
pub async fn download_certificate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers);
    let id = log_id(&state, token, id)?;
    let download = state.certificates.download(token, id).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.filename
    ))
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_MEDIA_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(download.bytes),
    )
        .into_response())
}
