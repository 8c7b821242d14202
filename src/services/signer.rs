//! RSA PKCS#1 v1.5 / SHA-256 signing and verification.

use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey};
use openssl::rsa::Padding;
use openssl::sign::{Signer, Verifier};

use crate::domain::crypto::{CanonicalMessage, Certificate, PrivateKey, SignatureValue};
use crate::infra::error::{RequestError, RequestResult};

/// Produces and checks `SignatureValue`s over canonical messages.
pub trait SignatureProvider {
    fn sign(&self, key: &PrivateKey, message: &CanonicalMessage) -> RequestResult<SignatureValue>;

    /// `Ok(false)` when the signature does not match; `Err` only when it
    /// cannot be checked at all.
    fn verify(
        &self,
        message: &CanonicalMessage,
        signature: &SignatureValue,
        certificate: &Certificate,
    ) -> RequestResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RsaSha256Signer;

impl SignatureProvider for RsaSha256Signer {
    fn sign(&self, key: &PrivateKey, message: &CanonicalMessage) -> RequestResult<SignatureValue> {
        let pkey = key.as_pkey();
        if pkey.id() != Id::RSA {
            return Err(RequestError::SigningFailed(format!(
                "unsupported key algorithm {:?}, expected RSA",
                pkey.id()
            )));
        }
        let failed = |e: openssl::error::ErrorStack| RequestError::SigningFailed(e.to_string());

        let mut signer = Signer::new(MessageDigest::sha256(), pkey).map_err(failed)?;
        signer.set_rsa_padding(Padding::PKCS1).map_err(failed)?;
        signer.update(message.as_bytes()).map_err(failed)?;
        let bytes = signer.sign_to_vec().map_err(failed)?;

        log::debug!("Produced {}-byte RSA signature", bytes.len());
        Ok(SignatureValue::from_bytes(&bytes))
    }

    fn verify(
        &self,
        message: &CanonicalMessage,
        signature: &SignatureValue,
        certificate: &Certificate,
    ) -> RequestResult<bool> {
        let signature_bytes = signature.decode().map_err(|e| {
            RequestError::VerificationError(format!("signature is not valid base64: {e}"))
        })?;
        let public_key = PKey::public_key_from_der(certificate.public_key_der()).map_err(|e| {
            RequestError::VerificationError(format!("unreadable certificate public key: {e}"))
        })?;

        // A key of another algorithm or modulus size cannot have produced this
        // signature; that is a mismatch, not a malformed input.
        if public_key.id() != Id::RSA {
            log::debug!("Certificate key is {:?}, not RSA", public_key.id());
            return Ok(false);
        }
        if signature_bytes.len() != public_key.size() {
            log::debug!(
                "Signature length {} does not match modulus size {}",
                signature_bytes.len(),
                public_key.size()
            );
            return Ok(false);
        }

        let failed = |e: openssl::error::ErrorStack| RequestError::VerificationError(e.to_string());
        let mut verifier = Verifier::new(MessageDigest::sha256(), &public_key).map_err(failed)?;
        verifier.set_rsa_padding(Padding::PKCS1).map_err(failed)?;
        verifier.update(message.as_bytes()).map_err(failed)?;
        verifier.verify(&signature_bytes).map_err(failed)
    }
}
