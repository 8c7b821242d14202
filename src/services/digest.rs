//! Digest engine over canonical messages.

use sha2::{Digest, Sha256};

use crate::domain::crypto::{CanonicalMessage, DigestValue};

/// Hashes canonical text into the value carried in `DigestValue`.
pub trait DigestProvider {
    fn digest(&self, message: &CanonicalMessage) -> DigestValue;
}

/// SHA-256 over the UTF-8 bytes of the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestProvider for Sha256Digest {
    fn digest(&self, message: &CanonicalMessage) -> DigestValue {
        let hash: [u8; 32] = Sha256::digest(message.as_bytes()).into();
        DigestValue::from_sha256(&hash)
    }
}
