use std::fmt;

use base64::Engine;
use sha2::{Digest, Sha256};

/// Certificate serial number in the signed decimal rendering the protocol
/// embeds in `X509SerialNumber`.
#[derive(Clone, PartialEq, Eq)]
pub struct SerialNumber {
    decimal: String,
}

impl SerialNumber {
    #[must_use]
    pub fn new(decimal: String) -> Self {
        Self { decimal }
    }
    #[must_use]
    pub fn to_decimal(&self) -> &str {
        &self.decimal
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decimal)
    }
}

impl fmt::Debug for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerialNumber({})", self.decimal)
    }
}

/// Validated end-entity signing certificate.
///
/// Only produced by the certificate validator, so holding one means the
/// certificate decoded cleanly and does not carry the CA flag.
#[derive(Clone)]
pub struct Certificate {
    der: Box<[u8]>,
    issuer_dn: String,
    subject_dn: String,
    serial_number: SerialNumber,
    /// DER `SubjectPublicKeyInfo`.
    public_key: Box<[u8]>,
}

impl Certificate {
    pub(crate) fn new(
        der: Vec<u8>,
        issuer_dn: String,
        subject_dn: String,
        serial_number: SerialNumber,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            der: der.into_boxed_slice(),
            issuer_dn,
            subject_dn,
            serial_number,
            public_key: public_key.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
    #[must_use]
    pub fn issuer_dn(&self) -> &str {
        &self.issuer_dn
    }
    #[must_use]
    pub fn subject_dn(&self) -> &str {
        &self.subject_dn
    }
    #[must_use]
    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key
    }

    /// Standard base64 of the DER bytes, as embedded in signed requests.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }

    /// Hex SHA-256 of the DER bytes. Safe to log.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("issuer", &self.issuer_dn)
            .field("serial", &self.serial_number)
            .field("len", &self.der.len())
            .finish()
    }
}
