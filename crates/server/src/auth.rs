//! Shared-secret gate for the admin surface.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Validates the `key` query parameter against the configured admin key.
///
/// Both sides are hashed before comparison, so the check runs in constant
/// time regardless of candidate length.
#[derive(Clone)]
pub struct AdminGate {
    key_digest: [u8; 32],
}

impl AdminGate {
    pub fn new(key: &str) -> Self {
        Self {
            key_digest: Sha256::digest(key.as_bytes()).into(),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        digest.ct_eq(&self.key_digest).into()
    }
}
