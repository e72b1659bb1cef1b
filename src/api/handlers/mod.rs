pub mod keys;

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::server::AppState;

pub use keys::{generate_key_handler, verify_key_handler};

// Common response type used by all helper functions
type ApiResponse = (StatusCode, HeaderMap, Json<serde_json::Value>);

pub fn success_response<T: Serialize>(data: T, headers: Option<HeaderMap>) -> ApiResponse {
    (
        StatusCode::OK,
        headers.unwrap_or_default(),
        Json(json!({
            "data": data,
            "error": null
        })),
    )
}

pub fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    headers: Option<HeaderMap>,
) -> ApiResponse {
    (
        status,
        headers.unwrap_or_default(),
        Json(json!({
            "data": null,
            "error": error.into()
        })),
    )
}

/// Service descriptor handler
///
/// This endpoint returns the service identity and its endpoints.
pub async fn service_info_handler() -> impl IntoResponse {
    let response = json!({
        "service": "keygate",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /key/generate",
            "verify": "POST /key/verify",
            "health": "GET /health",
        },
    });

    success_response(response, None)
}

/// Health check handler
///
/// This endpoint returns the health status of the key gate service.
///
/// # Arguments
///
/// * `state` - The application state
///
/// # Returns
///
/// * `impl IntoResponse` - The response
pub async fn health_handler(state: Extension<Arc<AppState>>) -> impl IntoResponse {
    // Check the connection to the storage backend
    let storage_ok = state.0.storage.exists("health-check").await.is_ok();

    let response = json!({
        "status": if storage_ok { "healthy" } else { "unhealthy" },
        "storage": storage_ok,
        "uptime_seconds": state.0.started_at.elapsed().as_secs(),
    });

    success_response(response, None)
}
