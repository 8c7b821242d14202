use std::fmt;

use openssl::pkey::{PKey, Private};
use zeroize::Zeroizing;

/// Decrypted signing key.
///
/// OpenSSL clears the key's bignums when the `PKey` is freed, so dropping
/// this value releases the material. It is never cloned, cached or logged.
pub struct PrivateKey {
    inner: PKey<Private>,
}

impl PrivateKey {
    pub(crate) fn new(inner: PKey<Private>) -> Self {
        Self { inner }
    }

    pub(crate) fn as_pkey(&self) -> &PKey<Private> {
        &self.inner
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.inner.bits()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(bits={}, [REDACTED])", self.inner.bits())
    }
}

/// Passphrase protecting the encrypted key file. Wiped on drop.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    #[must_use]
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}
