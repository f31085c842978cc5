//! API module for the log service

pub mod error;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::CorsOrigins;
use handlers::AppState;

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// Liveness check, no token required
///
/// GET /
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".into(),
        message: "Server is running".into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        // Liveness
        .route("/", get(status))
        // Auth
        .route("/api/auth/login", post(handlers::login))
        // Logs
        .route("/api/logs", post(handlers::create_logs).get(handlers::list_logs))
        .route("/api/logs/summary", get(handlers::log_summary))
        .route("/api/logs/{id}", get(handlers::get_log).delete(handlers::delete_log))
        .route("/api/logs/{id}/certificate", get(handlers::download_certificate))
        // Certificates
        .route("/api/certificates/render", post(handlers::render_certificate))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
