//! API request handlers

pub mod auth;
pub mod certificates;
pub mod logs;

pub use auth::{login, LoginRequest, LoginResponse};
pub use certificates::render_certificate;
pub use logs::{
    create_logs, delete_log, download_certificate, get_log, list_logs, log_summary,
    CreateLogsResponse, DeleteLogResponse, GetLogResponse, ListLogsResponse, SavedEntry,
};

use axum::{
    extract::{rejection::PathRejection, Path},
    http::{header::AUTHORIZATION, HeaderMap},
};
use std::sync::Arc;

use hipot_gate::AuthGate;

use crate::api::error::ApiError;
use crate::config::ServerConfig;
use crate::core::{CertificateService, IngestionService, QueryService};
use crate::storage::AuditStore;

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    pub gate: AuthGate,
    pub store: Arc<dyn AuditStore>,
    pub ingestion: IngestionService,
    pub query: QueryService,
    pub certificates: CertificateService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(gate: AuthGate, store: Arc<dyn AuditStore>, config: ServerConfig) -> Self {
        Self {
            ingestion: IngestionService::new(gate.clone(), store.clone()),
            query: QueryService::new(gate.clone(), store.clone()),
            certificates: CertificateService::new(gate.clone(), store.clone()),
            gate,
            store,
            config,
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Log id from the URL
///
/// A malformed id is only reported to an authenticated caller; anyone else
/// gets the token error.
pub fn log_id(
    state: &AppState,
    token: Option<&str>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<i64, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            state.gate.validate_token(token)?;
            Err(rejection.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
