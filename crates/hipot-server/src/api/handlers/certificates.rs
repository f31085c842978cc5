//! Server-side certificate rendering

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use hipot_core::{WorkOrderPayload, PDF_MEDIA_TYPE};

use crate::api::error::ApiError;
use crate::api::handlers::{bearer_token, AppState};

/// Render a certificate for a work order without storing it
///
/// POST /api/certificates/render
///
/// The body is a work order without `pdfData`; the response is the PDF.
pub async fn render_certificate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WorkOrderPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let principal = state.gate.validate_token(bearer_token(&headers))?;
    let Json(payload) = payload?;

    let certificate = state.certificates.render_for(&principal, payload)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(PDF_MEDIA_TYPE))],
        Body::from(certificate.into_bytes()),
    )
        .into_response())
}
