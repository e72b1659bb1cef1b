use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Extension};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::handlers::{error_response, success_response};
use crate::server::AppState;
use crate::GateError;

/// Key generation request
#[derive(Debug, Default, Deserialize)]
pub struct GenerateKeyRequest {
    /// Requested key lifetime in seconds; absent or zero falls back to
    /// the configured default TTL
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

/// Key verification request
#[derive(Debug, Deserialize)]
pub struct VerifyKeyRequest {
    /// The key to verify
    pub key: String,
}

/// Key generation handler
///
/// Issues a new key bound to the requesting peer address.
///
/// # Arguments
///
/// * `state` - The application state
/// * `peer` - The requesting peer address
/// * `request` - The generation request
///
/// # Returns
///
/// * `impl IntoResponse` - The response
pub async fn generate_key_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Option<Json<GenerateKeyRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let origin_address = peer.ip().to_string();

    info!(%origin_address, "key generation request");

    match state.issuer.issue(&origin_address, request.ttl_seconds).await {
        Ok(issued) => success_response(issued, None),
        Err(GateError::InvalidRequest(msg)) => error_response(StatusCode::BAD_REQUEST, msg, None),
        Err(err) => {
            error!("key issuance failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during key generation",
                None,
            )
        }
    }
}

/// Key verification handler
///
/// Verifies a presented key against the requesting peer address. A
/// rejected key is a 200 response carrying the verdict; only storage
/// and internal failures produce a 5xx.
///
/// # Arguments
///
/// * `state` - The application state
/// * `peer` - The requesting peer address
/// * `request` - The verification request
///
/// # Returns
///
/// * `impl IntoResponse` - The response
pub async fn verify_key_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(request): Json<VerifyKeyRequest>,
) -> impl IntoResponse {
    let client_address = peer.ip().to_string();

    info!(%client_address, "key verification request");

    match state
        .verifier
        .verify(&request.key, Some(&client_address))
        .await
    {
        Ok(verdict) => success_response(verdict, None),
        Err(err) => {
            error!("key verification failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during key verification",
                None,
            )
        }
    }
}
