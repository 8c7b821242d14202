//! Error types for request signing operations.
//!
//! Every pipeline step maps its failure onto exactly one variant so callers
//! can branch on the kind instead of parsing log output.

use thiserror::Error;

/// Result type for request signing operations
pub type RequestResult<T> = Result<T, RequestError>;

/// Failure kinds surfaced by the signing pipeline and its collaborators
#[derive(Error, Debug, miette::Diagnostic)]
pub enum RequestError {
    #[error("Malformed certificate: {0}")]
    #[diagnostic(
        code(descarga::certificate::malformed),
        help("Supply the DER (.cer) or PEM encoded signing certificate")
    )]
    MalformedCertificate(String),

    #[error("Certificate is a certificate authority, not a signing certificate (issuer: {issuer})")]
    #[diagnostic(
        code(descarga::certificate::authority),
        help("Use the end-entity signing certificate (CSD or e.firma), not its issuing CA")
    )]
    CertificateIsAuthority { issuer: String },

    #[error("Invalid passphrase or private key: {0}")]
    #[diagnostic(code(descarga::key::invalid))]
    InvalidPassphraseOrKey(String),

    #[error("Signature creation failed: {0}")]
    #[diagnostic(code(descarga::signature::failed))]
    SigningFailed(String),

    #[error("Signature verification error: {0}")]
    #[diagnostic(code(descarga::signature::verification))]
    VerificationError(String),

    #[error("Private key does not correspond to the certificate")]
    #[diagnostic(
        code(descarga::signature::mismatch),
        help("Check that the .key file was issued together with the .cer file")
    )]
    KeyCertificateMismatch,

    #[error("Canonical message build failed: {0}")]
    #[diagnostic(code(descarga::message::build))]
    CanonicalMessageBuildFailed(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(descarga::config))]
    ConfigurationError(String),

    #[error("Transport error: {0}")]
    #[diagnostic(code(descarga::transport))]
    TransportError(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(descarga::io))]
    IoError(String),
}

impl RequestError {
    /// True for failures of the certificate validation step.
    #[must_use]
    pub fn is_certificate_rejection(&self) -> bool {
        matches!(
            self,
            RequestError::MalformedCertificate(_) | RequestError::CertificateIsAuthority { .. }
        )
    }

    /// True when repeating the call with the same inputs cannot succeed.
    ///
    /// Key loading and transport failures are reported as non-permanent: the
    /// caller may retry with a corrected passphrase or once the service recovers.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            RequestError::InvalidPassphraseOrKey(_)
                | RequestError::TransportError(_)
                | RequestError::IoError(_)
        )
    }
}

impl From<der::Error> for RequestError {
    fn from(error: der::Error) -> Self {
        RequestError::MalformedCertificate(error.to_string())
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(error: reqwest::Error) -> Self {
        RequestError::TransportError(error.to_string())
    }
}

impl From<std::io::Error> for RequestError {
    fn from(error: std::io::Error) -> Self {
        RequestError::IoError(error.to_string())
    }
}
