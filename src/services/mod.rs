//! Service layer module root.
//! Contains certificate and key handling plus the digest, signature and
//! message building steps of the request pipeline.

pub mod cert_validator;
pub mod digest;
pub mod key_loader;
pub mod message_builder;
pub mod signer;

pub use cert_validator::CertificateValidator;
pub use digest::{DigestProvider, Sha256Digest};
pub use key_loader::KeyLoader;
pub use message_builder::{CanonicalMessageBuilder, SatMessageBuilder};
pub use signer::{RsaSha256Signer, SignatureProvider};
