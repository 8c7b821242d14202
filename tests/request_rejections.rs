//! Every operation refuses bad signing material with the matching error kind.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::{authority, leaf, unrelated_key, PASSPHRASE};
use descarga_signer::domain::crypto::{CanonicalMessage, PrivateKey};
use descarga_signer::domain::operation::SignatureParts;
use descarga_signer::{
    CanonicalMessageBuilder, Certificate, DigestProvider, DigestValue, Operation, OperationKind, Passphrase,
    RequestError, RequestResult, RequestWorkflow, RsaSha256Signer, SatMessageBuilder,
    Sha256Digest, SignatureProvider, SignatureValue, SignedRequest, SigningMaterial,
};
use uuid::Uuid;

const RFC: &str = "AAA010101AAA";

/// Runs all four operations with the same material.
fn all_operations(material: SigningMaterial<'_>) -> Vec<RequestResult<SignedRequest>> {
    all_operations_with(&RequestWorkflow::default(), material)
}

fn all_operations_with<M, D, S>(
    workflow: &RequestWorkflow<M, D, S>,
    material: SigningMaterial<'_>,
) -> Vec<RequestResult<SignedRequest>>
where
    M: CanonicalMessageBuilder,
    D: DigestProvider,
    S: SignatureProvider,
{
    vec![
        workflow.authenticate(
            Uuid::new_v4(),
            "2023-01-01T12:00:00.000Z",
            "2023-01-01T12:05:00.000Z",
            material,
        ),
        workflow.query("2023-01-01", "2023-01-31", RFC, "CFDI", material),
        workflow.verify(RFC, "4e80345d-917f-40bb-a98f-4a73939343c5", material),
        workflow.download(RFC, "4E80345D-917F-40BB-A98F-4A73939343C5_01", material),
    ]
}

#[test]
fn authority_certificate_is_refused() {
    let fixture = authority();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);

    for result in all_operations(material) {
        let err = result.unwrap_err();
        assert!(
            matches!(err, RequestError::CertificateIsAuthority { ref issuer } if issuer.contains("CN=AC UAT")),
            "unexpected error: {err:?}"
        );
        assert!(err.is_certificate_rejection());
        assert!(err.is_permanent());
    }
}

#[test]
fn mismatched_key_is_detected_by_self_verification() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material = SigningMaterial::new(&fixture.certificate_der, unrelated_key(), &passphrase);

    for result in all_operations(material) {
        assert!(matches!(
            result.unwrap_err(),
            RequestError::KeyCertificateMismatch
        ));
    }
}

#[test]
fn empty_certificate_is_malformed() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material = SigningMaterial::new(&[], &fixture.encrypted_key, &passphrase);

    for result in all_operations(material) {
        let err = result.unwrap_err();
        assert!(matches!(err, RequestError::MalformedCertificate(_)));
        assert!(err.is_certificate_rejection());
    }
}

#[test]
fn garbage_certificate_is_malformed() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let garbage = b"not a certificate at all";
    let truncated = &fixture.certificate_der[..fixture.certificate_der.len() / 2];

    for certificate in [&garbage[..], truncated] {
        let material = SigningMaterial::new(certificate, &fixture.encrypted_key, &passphrase);
        for result in all_operations(material) {
            assert!(matches!(
                result.unwrap_err(),
                RequestError::MalformedCertificate(_)
            ));
        }
    }
}

#[test]
fn wrong_passphrase_is_reported_without_detail() {
    let fixture = leaf();
    let passphrase = Passphrase::new("not-the-passphrase");
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);

    for result in all_operations(material) {
        let err = result.unwrap_err();
        assert!(matches!(err, RequestError::InvalidPassphraseOrKey(_)));
        assert!(!err.is_permanent());
        assert!(!err.to_string().contains("not-the-passphrase"));
    }
}

#[test]
fn invalid_parameters_fail_message_building() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);
    let workflow = RequestWorkflow::default();

    let cases = [
        workflow.query("2023-01-01", "2023-01-31", "SHORT", "CFDI", material),
        workflow.query("2023-01-01", "2023-01-31", RFC, "XML", material),
        workflow.query("", "2023-01-31", RFC, "CFDI", material),
        workflow.verify(RFC, "", material),
        workflow.download(RFC, "   ", material),
        workflow.authenticate(Uuid::nil(), "", "2023-01-01T12:05:00.000Z", material),
    ];
    for result in cases {
        assert!(matches!(
            result.unwrap_err(),
            RequestError::CanonicalMessageBuildFailed(_)
        ));
    }
}

/// Counts `sign` calls, then signs for real.
struct CountingSigner<'a> {
    calls: &'a AtomicUsize,
}

impl SignatureProvider for CountingSigner<'_> {
    fn sign(&self, key: &PrivateKey, message: &CanonicalMessage) -> RequestResult<SignatureValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RsaSha256Signer.sign(key, message)
    }

    fn verify(
        &self,
        message: &CanonicalMessage,
        signature: &SignatureValue,
        certificate: &Certificate,
    ) -> RequestResult<bool> {
        RsaSha256Signer.verify(message, signature, certificate)
    }
}

/// Signs normally but never accepts a signature.
struct RejectingVerifier;

impl SignatureProvider for RejectingVerifier {
    fn sign(&self, key: &PrivateKey, message: &CanonicalMessage) -> RequestResult<SignatureValue> {
        RsaSha256Signer.sign(key, message)
    }

    fn verify(
        &self,
        _: &CanonicalMessage,
        _: &SignatureValue,
        _: &Certificate,
    ) -> RequestResult<bool> {
        Ok(false)
    }
}

/// Builds both canonical messages but fails on the final envelope.
struct FailingEnvelope;

impl CanonicalMessageBuilder for FailingEnvelope {
    fn digest_message(&self, operation: &Operation) -> RequestResult<CanonicalMessage> {
        SatMessageBuilder.digest_message(operation)
    }

    fn signed_info(
        &self,
        kind: OperationKind,
        digest: &DigestValue,
    ) -> RequestResult<CanonicalMessage> {
        SatMessageBuilder.signed_info(kind, digest)
    }

    fn signed_request(
        &self,
        operation: &Operation,
        _: &SignatureParts<'_>,
    ) -> RequestResult<String> {
        Err(RequestError::CanonicalMessageBuildFailed(format!(
            "no envelope for {}",
            operation.kind()
        )))
    }
}

#[test]
fn authority_certificate_is_refused_before_signing() {
    let fixture = authority();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);
    let calls = AtomicUsize::new(0);
    let workflow =
        RequestWorkflow::new(SatMessageBuilder, Sha256Digest, CountingSigner { calls: &calls });

    for result in all_operations_with(&workflow, material) {
        assert!(matches!(
            result.unwrap_err(),
            RequestError::CertificateIsAuthority { .. }
        ));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn injected_signer_signs_once_per_request() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);
    let calls = AtomicUsize::new(0);
    let workflow =
        RequestWorkflow::new(SatMessageBuilder, Sha256Digest, CountingSigner { calls: &calls });

    for result in all_operations_with(&workflow, material) {
        result.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn envelope_failure_propagates() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);
    let workflow = RequestWorkflow::new(FailingEnvelope, Sha256Digest, RsaSha256Signer);

    for result in all_operations_with(&workflow, material) {
        assert!(matches!(
            result.unwrap_err(),
            RequestError::CanonicalMessageBuildFailed(ref detail)
                if detail.starts_with("no envelope for")
        ));
    }
}

#[test]
fn rejected_self_verification_is_a_mismatch() {
    let fixture = leaf();
    let passphrase = Passphrase::new(PASSPHRASE);
    let material =
        SigningMaterial::new(&fixture.certificate_der, &fixture.encrypted_key, &passphrase);
    let workflow = RequestWorkflow::new(SatMessageBuilder, Sha256Digest, RejectingVerifier);

    for result in all_operations_with(&workflow, material) {
        assert!(matches!(
            result.unwrap_err(),
            RequestError::KeyCertificateMismatch
        ));
    }
}
