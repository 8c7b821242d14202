//! `RequestWorkflow` builds and signs the four bulk download requests.
//!
//! Every operation runs the same pipeline:
//! 1. validate the certificate (leaf only)
//! 2. digest the operation's canonical payload
//! 3. wrap that digest in the canonical `SignedInfo`
//! 4. decrypt the key and sign `SignedInfo`; the key is dropped right after
//! 5. verify the new signature against the certificate
//!
//! Only then is the final payload rendered. Any failure aborts the call
//! with a typed error; no partial payload is ever returned.

use uuid::Uuid;

use crate::domain::crypto::{CanonicalMessage, Certificate, Passphrase, SignatureValue};
use crate::domain::operation::{
    AuthenticateParams, DownloadParams, IssuerSerial, Operation, QueryParams, SignatureParts,
    SignedRequest, VerifyParams,
};
use crate::domain::types::{AuthenticationWindow, Rfc};
use crate::infra::error::{RequestError, RequestResult};
use crate::services::cert_validator::CertificateValidator;
use crate::services::digest::{DigestProvider, Sha256Digest};
use crate::services::key_loader::KeyLoader;
use crate::services::message_builder::{CanonicalMessageBuilder, SatMessageBuilder};
use crate::services::signer::{RsaSha256Signer, SignatureProvider};

/// Raw signing material supplied by the caller for one call.
#[derive(Clone, Copy)]
pub struct SigningMaterial<'a> {
    pub certificate: &'a [u8],
    pub encrypted_key: &'a [u8],
    pub passphrase: &'a Passphrase,
}

impl<'a> SigningMaterial<'a> {
    #[must_use]
    pub fn new(certificate: &'a [u8], encrypted_key: &'a [u8], passphrase: &'a Passphrase) -> Self {
        Self {
            certificate,
            encrypted_key,
            passphrase,
        }
    }
}

impl std::fmt::Debug for SigningMaterial<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningMaterial")
            .field("certificate_len", &self.certificate.len())
            .field("encrypted_key_len", &self.encrypted_key.len())
            .finish_non_exhaustive()
    }
}

/// Stateless orchestrator over pluggable message, digest and signature providers.
///
/// Holds no per-call state, so a single instance may be shared across threads.
pub struct RequestWorkflow<M = SatMessageBuilder, D = Sha256Digest, S = RsaSha256Signer> {
    messages: M,
    digests: D,
    signer: S,
}

impl Default for RequestWorkflow {
    fn default() -> Self {
        Self::new(SatMessageBuilder, Sha256Digest, RsaSha256Signer)
    }
}

impl<M, D, S> RequestWorkflow<M, D, S>
where
    M: CanonicalMessageBuilder,
    D: DigestProvider,
    S: SignatureProvider,
{
    #[must_use]
    pub fn new(messages: M, digests: D, signer: S) -> Self {
        Self {
            messages,
            digests,
            signer,
        }
    }

    /// Sign an authentication request valid between `created` and `expires`.
    pub fn authenticate(
        &self,
        request_id: Uuid,
        created: &str,
        expires: &str,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let certificate = CertificateValidator::validate(material.certificate)?;
        let operation = Operation::Authenticate(AuthenticateParams {
            request_id,
            window: AuthenticationWindow::new(created, expires)?,
        });
        self.run(&operation, &certificate, material)
    }

    /// Sign a download query for invoices issued by `issuer_rfc` in the date range.
    pub fn query(
        &self,
        date_from: &str,
        date_to: &str,
        issuer_rfc: &str,
        request_type: &str,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let certificate = CertificateValidator::validate(material.certificate)?;
        let operation = Operation::Query(QueryParams {
            date_from: date_from.to_string(),
            date_to: date_to.to_string(),
            issuer_rfc: Rfc::new(issuer_rfc)?,
            request_type: request_type.parse()?,
        });
        self.run(&operation, &certificate, material)
    }

    /// Sign a status check for a previously accepted query.
    pub fn verify(
        &self,
        issuer_rfc: &str,
        request_id: &str,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let certificate = CertificateValidator::validate(material.certificate)?;
        let operation = Operation::Verify(VerifyParams {
            issuer_rfc: Rfc::new(issuer_rfc)?,
            request_id: request_id.to_string(),
        });
        self.run(&operation, &certificate, material)
    }

    /// Sign a package download request.
    pub fn download(
        &self,
        issuer_rfc: &str,
        package_id: &str,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let certificate = CertificateValidator::validate(material.certificate)?;
        let operation = Operation::Download(DownloadParams {
            issuer_rfc: Rfc::new(issuer_rfc)?,
            package_id: package_id.to_string(),
        });
        self.run(&operation, &certificate, material)
    }

    /// Sign an already parameterised operation.
    pub fn sign_operation(
        &self,
        operation: &Operation,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let certificate = CertificateValidator::validate(material.certificate)?;
        self.run(operation, &certificate, material)
    }

    fn run(
        &self,
        operation: &Operation,
        certificate: &Certificate,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignedRequest> {
        let kind = operation.kind();
        log::info!("Signing {kind} request");
        log::debug!(
            "Using certificate serial {} issued by {}",
            certificate.serial_number(),
            certificate.issuer_dn()
        );

        let payload = self.messages.digest_message(operation)?;
        let digest = self.digests.digest(&payload);
        log::debug!("{kind} payload digest: {digest}");

        let signed_info = self.messages.signed_info(kind, &digest)?;
        let signature = self.sign(&signed_info, material)?;

        if !self.signer.verify(&signed_info, &signature, certificate)? {
            log::warn!(
                "{kind} signature does not verify against certificate {}",
                certificate.fingerprint_hex()
            );
            return Err(RequestError::KeyCertificateMismatch);
        }

        let certificate_base64 = certificate.to_base64();
        let issuer_serial = kind.embeds_issuer_serial().then(|| IssuerSerial {
            issuer_dn: certificate.issuer_dn(),
            serial_number: certificate.serial_number().to_decimal(),
        });
        let parts = SignatureParts {
            certificate_base64: &certificate_base64,
            issuer_serial,
            digest: &digest,
            signature: &signature,
        };
        let request = self.messages.signed_request(operation, &parts)?;

        log::info!("Signed {kind} request ({} bytes)", request.len());
        Ok(SignedRequest::new(kind, request, digest, signature))
    }

    /// Decrypts the key only for the duration of the signature.
    fn sign(
        &self,
        signed_info: &CanonicalMessage,
        material: SigningMaterial<'_>,
    ) -> RequestResult<SignatureValue> {
        let key = KeyLoader::load(material.encrypted_key, material.passphrase)?;
        self.signer.sign(&key, signed_info)
    }
}
