use std::fmt;

use base64::Engine;

/// Base64 rendering of an RSA PKCS#1 v1.5 signature over a SignedInfo message.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureValue(String);

impl SignatureValue {
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Wrap an encoded value as found in a payload. Decoding is deferred to
    /// [`SignatureValue::decode`] so verification can report bad encodings.
    #[must_use]
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SignatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureValue(len={})", self.0.len())
    }
}
