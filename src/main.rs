use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use keygate::config::{default_config, load_config};
use keygate::server::{shutdown_signal, start_server};
use keygate::storage::create_storage;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Keygate access key service
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Bind address for the server
    #[clap(short, long, value_parser)]
    bind: Option<String>,

    /// Enable verbose logging (can be specified multiple times)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "keygate=info,tower_http=debug".into()),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading configuration from {}", config_path.display());
        match load_config(&config_path.to_string_lossy()) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load configuration: {err}");
                warn!("Using default configuration instead");
                default_config()
            }
        }
    } else {
        info!("Using default configuration");
        default_config()
    };

    // Override configuration with command line arguments
    if let Some(bind) = cli.bind {
        config.listen_addr = bind.parse()?;
    }

    // Create the storage backend, opened once and shared for the
    // lifetime of the process
    let storage = create_storage(&config.storage)
        .await
        .map_err(|e| eyre::eyre!("Failed to create storage: {e}"))?;

    info!("Starting key gate service");

    tokio::select! {
        result = start_server(config, storage) => {
            if let Err(err) = result {
                eprintln!("Server error: {err}");
                return Err(err);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, shutting down");
        }
    }

    Ok(())
}
