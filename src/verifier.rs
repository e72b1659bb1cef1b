use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::config::PolicyConfig;
use crate::storage::{KeyStore, Storage};
use crate::GateError;

/// Reason code attached to a verification verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The key is valid
    None,
    /// The presented string failed format or checksum validation
    Malformed,
    /// No record exists for the presented key
    NotFound,
    /// The presenting address does not match the bound address
    AddressMismatch,
    /// The key has expired
    Expired,
}

/// Structured result of a verification attempt
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Whether the key is valid for the presenting client
    pub valid: bool,

    /// Why the key was rejected; `NONE` when valid
    pub reason: RejectReason,

    /// The address the key is bound to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_address: Option<String>,
}

impl Verdict {
    fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            reason,
            bound_address: None,
        }
    }

    fn accepted(bound_address: String) -> Self {
        Self {
            valid: true,
            reason: RejectReason::None,
            bound_address: Some(bound_address),
        }
    }
}

/// The two loopback literals recognized by the localhost bypass.
fn is_loopback_literal(address: &str) -> bool {
    address == "127.0.0.1" || address == "::1"
}

/// Key verifier
///
/// Applies the ordered verification pipeline: format check, lookup,
/// address-binding policy, expiration. Each step short-circuits the rest.
#[derive(Clone)]
pub struct KeyVerifier {
    store: KeyStore,
    address_binding_enabled: bool,
    localhost_bypass_enabled: bool,
}

impl KeyVerifier {
    /// Create a new key verifier
    ///
    /// # Arguments
    ///
    /// * `policy` - The verification policy configuration
    /// * `storage` - Storage backend
    pub fn new(policy: &PolicyConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            store: KeyStore::new(storage),
            address_binding_enabled: policy.address_binding_enabled,
            localhost_bypass_enabled: policy.localhost_bypass_enabled,
        }
    }

    /// Verify a presented key for a client address
    ///
    /// Rejections come back as an `Ok` verdict with a reason code; an `Err`
    /// means the store failed and must not be read as "key is invalid".
    ///
    /// # Arguments
    ///
    /// * `presented` - The key string as presented by the client
    /// * `client_address` - The address presenting the key
    ///
    /// # Returns
    ///
    /// * `Result<Verdict, GateError>` - The verification verdict
    pub async fn verify(
        &self,
        presented: &str,
        client_address: Option<&str>,
    ) -> Result<Verdict, GateError> {
        // Garbage input is rejected locally, before any storage round trip
        if !codec::validate(presented) {
            debug!("rejected malformed key");
            return Ok(Verdict::rejected(RejectReason::Malformed));
        }

        let record = match self.store.find_by_key(presented).await? {
            Some(record) => record,
            None => return Ok(Verdict::rejected(RejectReason::NotFound)),
        };

        if self.address_binding_enabled {
            let presented_address = client_address.unwrap_or("");
            if record.origin_address != presented_address {
                let bypassed = self.localhost_bypass_enabled
                    && is_loopback_literal(&record.origin_address)
                    && is_loopback_literal(presented_address);

                if !bypassed {
                    debug!(
                        bound = %record.origin_address,
                        presented = %presented_address,
                        "rejected key presented from a different address"
                    );
                    return Ok(Verdict {
                        valid: false,
                        reason: RejectReason::AddressMismatch,
                        bound_address: Some(record.origin_address),
                    });
                }
            }
        }

        let now = Utc::now().timestamp_millis() as u64;
        if record.is_expired(now) {
            return Ok(Verdict::rejected(RejectReason::Expired));
        }

        Ok(Verdict::accepted(record.origin_address))
    }
}
