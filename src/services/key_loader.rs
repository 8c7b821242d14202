//! Encrypted private key loading.

use openssl::pkey::PKey;

use crate::domain::crypto::{Passphrase, PrivateKey};
use crate::infra::error::{RequestError, RequestResult};

const PEM_PREFIX: &[u8] = b"-----BEGIN";

pub struct KeyLoader;

impl KeyLoader {
    /// Decrypt a PKCS#8 `EncryptedPrivateKeyInfo` (DER, as in the `.key` files
    /// the tax authority issues, or PEM) with `passphrase`.
    ///
    /// A wrong passphrase and a corrupt key are reported identically; the
    /// OpenSSL detail goes to the debug log only.
    pub fn load(encrypted_key: &[u8], passphrase: &Passphrase) -> RequestResult<PrivateKey> {
        if encrypted_key.is_empty() {
            return Err(RequestError::InvalidPassphraseOrKey(
                "private key input is empty".to_string(),
            ));
        }

        let decoded = if encrypted_key.starts_with(PEM_PREFIX) {
            PKey::private_key_from_pem_passphrase(encrypted_key, passphrase.as_bytes())
        } else {
            PKey::private_key_from_pkcs8_passphrase(encrypted_key, passphrase.as_bytes())
        };

        match decoded {
            Ok(pkey) => {
                log::debug!("Loaded {}-bit private key", pkey.bits());
                Ok(PrivateKey::new(pkey))
            }
            Err(e) => {
                log::debug!("Private key decryption failed: {e}");
                Err(RequestError::InvalidPassphraseOrKey(
                    "unable to decrypt private key with the supplied passphrase".to_string(),
                ))
            }
        }
    }
}
