//! Foundational cryptographic domain types.
//!
//! Strongly-typed wrappers for the values flowing through the signing
//! pipeline: the validated certificate, the decrypted key, the canonical
//! text and the base64 digest/signature values derived from it.

mod cert;
mod digest;
mod key;
mod message;
mod signature;

pub use cert::{Certificate, SerialNumber};
pub use digest::{DigestValue, DigestValueError, SHA256_DIGEST_SIZE};
pub use key::{Passphrase, PrivateKey};
pub use message::CanonicalMessage;
pub use signature::SignatureValue;
