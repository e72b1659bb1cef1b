use serde::{Deserialize, Serialize};

/// Storage prefixes for different types of data
pub mod prefixes {
    /// Prefix for issued access keys
    pub const ACCESS_KEY: &str = "key:";
}

/// Issued access key storage model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    /// The formatted key string
    pub key: String,

    /// The network address the key was issued for
    pub origin_address: String,

    /// When the key was issued (Unix millis)
    pub issued_at: u64,

    /// When the key expires (Unix millis); absent means never expires
    pub expires_at: Option<u64>,
}

impl KeyRecord {
    /// Create a new key record
    pub fn new(
        key: String,
        origin_address: String,
        issued_at: u64,
        expires_at: Option<u64>,
    ) -> Self {
        Self {
            key,
            origin_address,
            issued_at,
            expires_at,
        }
    }

    /// Check whether the key is expired at the given instant
    pub fn is_expired(&self, now_millis: u64) -> bool {
        self.expires_at.is_some_and(|expires| now_millis >= expires)
    }
}
