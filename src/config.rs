use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Key gate service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygateConfig {
    /// The address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Verification policy settings
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Storage settings
    pub storage: StorageConfig,

    /// CORS settings
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:3000".parse().unwrap()
}

/// Verification policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Require the verifying address to match the issuing address
    #[serde(default = "default_true")]
    pub address_binding_enabled: bool,

    /// Treat the IPv4 and IPv6 loopback literals as interchangeable
    /// when the address binding check fails
    #[serde(default)]
    pub localhost_bypass_enabled: bool,

    /// Emit generated keys in uppercase
    #[serde(default = "default_true")]
    pub key_uppercase: bool,

    /// TTL applied when an issuance request carries none.
    /// When absent, keys issued without a TTL never expire.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            address_binding_enabled: default_true(),
            localhost_bypass_enabled: false,
            key_uppercase: default_true(),
            default_ttl_seconds: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// RocksDB storage
    #[serde(rename = "rocksdb")]
    RocksDB {
        /// The path to the RocksDB database
        path: PathBuf,
    },

    /// In-memory storage (for development only)
    #[serde(rename = "memory")]
    Memory,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allow all origins
    #[serde(default = "default_true")]
    pub allow_all_origins: bool,

    /// Allowed origins (if allow_all_origins is false)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allowed methods
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
}

fn default_allowed_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

fn default_allowed_headers() -> Vec<String> {
    vec!["Content-Type".to_string(), "Accept".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_all_origins: true,
            allowed_origins: Vec::new(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
        }
    }
}

/// Load the configuration from a file
///
/// Values from the environment override the file, using the `KEYGATE`
/// prefix with `__` as the nesting separator.
///
/// # Arguments
///
/// * `path` - The path to the configuration file
///
/// # Returns
///
/// * `Result<KeygateConfig, eyre::Error>` - The loaded configuration
pub fn load_config(path: &str) -> eyre::Result<KeygateConfig> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("KEYGATE").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(config)
}

/// Generate a default configuration
///
/// # Returns
///
/// * `KeygateConfig` - The default configuration
pub fn default_config() -> KeygateConfig {
    KeygateConfig {
        listen_addr: default_listen_addr(),
        policy: PolicyConfig::default(),
        storage: StorageConfig::RocksDB {
            path: PathBuf::from("./data/keygate_db"),
        },
        cors: CorsConfig::default(),
    }
}
