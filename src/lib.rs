use thiserror::Error;

use crate::storage::StorageError;

pub mod api;
pub mod codec;
pub mod config;
pub mod issuer;
pub mod server;
pub mod storage;
pub mod verifier;

pub use issuer::{IssuedKey, KeyIssuer};
pub use verifier::{KeyVerifier, RejectReason, Verdict};

/// Error that can occur while issuing or verifying keys
///
/// Verification rejections (malformed, unknown, mismatched, expired keys)
/// are not errors; they are reported as reason codes in a [`Verdict`].
/// An error here means the request itself was unacceptable or the system
/// is broken.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
