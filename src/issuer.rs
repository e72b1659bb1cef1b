use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::KeyCodec;
use crate::config::PolicyConfig;
use crate::storage::{KeyRecord, KeyStore, Storage, StorageError};
use crate::GateError;

/// Attempts before a key collision is surfaced to the caller.
///
/// With 120 bits of entropy a collision is astronomically rare; the bound
/// exists so a broken store cannot spin the issuer forever.
const MAX_GENERATION_ATTEMPTS: u32 = 3;

/// Result of a successful issuance
#[derive(Debug, Clone, Serialize)]
pub struct IssuedKey {
    /// The generated key string
    pub key: String,

    /// The address the key is bound to
    pub origin_address: String,

    /// When the key was issued
    pub issued_at: DateTime<Utc>,

    /// When the key expires; absent means never
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Key issuer
///
/// Generates a fresh key via the codec and persists it together with its
/// binding metadata. Issuance is not idempotent: a retry by the caller
/// mints a new, different key.
#[derive(Clone)]
pub struct KeyIssuer {
    codec: KeyCodec,
    store: KeyStore,
    default_ttl_seconds: Option<u64>,
}

impl KeyIssuer {
    /// Create a new key issuer
    ///
    /// # Arguments
    ///
    /// * `policy` - The verification policy configuration
    /// * `storage` - Storage backend
    pub fn new(policy: &PolicyConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            codec: KeyCodec::new(policy.key_uppercase),
            store: KeyStore::new(storage),
            default_ttl_seconds: policy.default_ttl_seconds,
        }
    }

    /// Issue a new key bound to the given origin address
    ///
    /// A missing or zero TTL falls back to the configured default TTL;
    /// when no default is configured either, the key never expires.
    ///
    /// # Arguments
    ///
    /// * `origin_address` - The network address the key is bound to
    /// * `ttl_seconds` - Requested key lifetime
    ///
    /// # Returns
    ///
    /// * `Result<IssuedKey, GateError>` - The issuance record
    pub async fn issue(
        &self,
        origin_address: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<IssuedKey, GateError> {
        if origin_address.is_empty() {
            return Err(GateError::InvalidRequest(
                "origin address must not be empty".to_string(),
            ));
        }

        let ttl = ttl_seconds.filter(|t| *t > 0).or(self.default_ttl_seconds);

        let issued_at = Utc::now();
        let expires_at = ttl.map(|t| issued_at + Duration::seconds(t as i64));

        let mut attempts = 0;
        let key = loop {
            attempts += 1;
            let key = self.codec.generate();
            let record = KeyRecord::new(
                key.clone(),
                origin_address.to_string(),
                issued_at.timestamp_millis() as u64,
                expires_at.map(|e| e.timestamp_millis() as u64),
            );

            match self.store.insert_key(&record).await {
                Ok(()) => break key,
                Err(StorageError::UniqueViolation) if attempts < MAX_GENERATION_ATTEMPTS => {
                    warn!(attempts, "generated key collided with an existing record, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        };

        debug!(origin_address, "issued access key");

        Ok(IssuedKey {
            key,
            origin_address: origin_address.to_string(),
            issued_at,
            expires_at,
        })
    }
}
