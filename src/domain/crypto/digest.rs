use std::fmt;

use base64::Engine;

/// Size of a SHA-256 digest, the only digest the protocol accepts.
pub const SHA256_DIGEST_SIZE: usize = 32;

/// Base64 rendering of a SHA-256 digest over a canonical message.
///
/// Invariant: decodes to exactly `SHA256_DIGEST_SIZE` bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DigestValue(String);

impl DigestValue {
    #[must_use]
    pub fn from_sha256(digest: &[u8; SHA256_DIGEST_SIZE]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(digest))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DigestValueError> {
        if bytes.len() != SHA256_DIGEST_SIZE {
            return Err(DigestValueError::LengthMismatch {
                expected: SHA256_DIGEST_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self(base64::engine::general_purpose::STANDARD.encode(bytes)))
    }

    /// Parse a digest lifted out of a signed request.
    pub fn from_base64(encoded: &str) -> Result<Self, DigestValueError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| DigestValueError::Encoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestValue({})", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestValueError {
    #[error("digest length mismatch (expected {expected}, actual {actual})")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("digest is not valid base64: {0}")]
    Encoding(String),
}
