//! The four protocol operations and their parameter sets.

use std::fmt;

use uuid::Uuid;

use crate::domain::crypto::{DigestValue, SignatureValue};
use crate::domain::types::{AuthenticationWindow, RequestType, Rfc};

/// Which of the four web service calls a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Authenticate,
    Query,
    Verify,
    Download,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Authenticate,
        OperationKind::Query,
        OperationKind::Verify,
        OperationKind::Download,
    ];

    /// Whether the signed request carries the issuer DN and serial number.
    #[must_use]
    pub fn embeds_issuer_serial(&self) -> bool {
        !matches!(self, OperationKind::Authenticate)
    }

    /// Whether the call must present an access token.
    #[must_use]
    pub fn requires_token(&self) -> bool {
        !matches!(self, OperationKind::Authenticate)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Authenticate => "authenticate",
            OperationKind::Query => "query",
            OperationKind::Verify => "verify",
            OperationKind::Download => "download",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateParams {
    pub request_id: Uuid,
    pub window: AuthenticationWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub date_from: String,
    pub date_to: String,
    pub issuer_rfc: Rfc,
    pub request_type: RequestType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyParams {
    pub issuer_rfc: Rfc,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadParams {
    pub issuer_rfc: Rfc,
    pub package_id: String,
}

/// A fully parameterised operation, ready for the message builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Authenticate(AuthenticateParams),
    Query(QueryParams),
    Verify(VerifyParams),
    Download(DownloadParams),
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Authenticate(_) => OperationKind::Authenticate,
            Operation::Query(_) => OperationKind::Query,
            Operation::Verify(_) => OperationKind::Verify,
            Operation::Download(_) => OperationKind::Download,
        }
    }
}

/// Certificate fields a final payload may embed.
#[derive(Debug, Clone, Copy)]
pub struct IssuerSerial<'a> {
    pub issuer_dn: &'a str,
    pub serial_number: &'a str,
}

/// Everything the final payload builder needs besides the operation itself.
#[derive(Debug, Clone, Copy)]
pub struct SignatureParts<'a> {
    pub certificate_base64: &'a str,
    /// `None` for Authenticate.
    pub issuer_serial: Option<IssuerSerial<'a>>,
    pub digest: &'a DigestValue,
    pub signature: &'a SignatureValue,
}

/// Finished, self-verified request payload.
#[derive(Clone)]
pub struct SignedRequest {
    kind: OperationKind,
    payload: String,
    digest: DigestValue,
    signature: SignatureValue,
}

impl SignedRequest {
    pub(crate) fn new(
        kind: OperationKind,
        payload: String,
        digest: DigestValue,
        signature: SignatureValue,
    ) -> Self {
        Self {
            kind,
            payload,
            digest,
            signature,
        }
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
    /// Digest of the first-stage canonical message.
    #[must_use]
    pub fn digest(&self) -> &DigestValue {
        &self.digest
    }
    #[must_use]
    pub fn signature(&self) -> &SignatureValue {
        &self.signature
    }
    #[must_use]
    pub fn into_payload(self) -> String {
        self.payload
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("kind", &self.kind)
            .field("payload_len", &self.payload.len())
            .field("digest", &self.digest)
            .finish()
    }
}
