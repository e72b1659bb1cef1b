use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::signal;
use tracing::info;

use crate::api::routes;
use crate::config::KeygateConfig;
use crate::issuer::KeyIssuer;
use crate::storage::Storage;
use crate::verifier::KeyVerifier;

/// Shared application state available to the request handlers
pub struct AppState {
    /// The key issuer
    pub issuer: KeyIssuer,

    /// The key verifier
    pub verifier: KeyVerifier,

    /// The storage backend, kept for health probing
    pub storage: Arc<dyn Storage>,

    /// When the service started
    pub started_at: Instant,
}

/// Start the key gate service
///
/// # Arguments
///
/// * `config` - The configuration
/// * `storage` - The storage backend
///
/// # Returns
///
/// * `Result<(), eyre::Error>` - Success or error
pub async fn start_server(config: KeygateConfig, storage: Arc<dyn Storage>) -> eyre::Result<()> {
    let issuer = KeyIssuer::new(&config.policy, Arc::clone(&storage));
    let verifier = KeyVerifier::new(&config.policy, Arc::clone(&storage));

    let state = Arc::new(AppState {
        issuer,
        verifier,
        storage,
        started_at: Instant::now(),
    });

    // Set up the router with all routes
    let app = routes::create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", config.listen_addr);

    // Handlers read the peer address to bind and verify keys
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {e}"))?;

    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
