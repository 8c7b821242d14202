//! Canonical message builder.
//!
//! Renders, for each operation, the three texts the pipeline needs:
//! - the payload element whose SHA-256 becomes `DigestValue`
//! - the `SignedInfo` element embedding that digest, which is what gets signed
//! - the final SOAP envelope carrying certificate, digest and signature
//!
//! Output is in exclusive C14N form (no whitespace between elements,
//! attributes in sorted order, empty elements as start/end pairs, C14N
//! escaping). The service recomputes the digest over the same form, so any
//! deviation breaks interoperability.

use crate::domain::constants::{
    ALG_ENVELOPED_SIGNATURE, ALG_EXC_C14N, ALG_RSA_SHA256, ALG_SHA256, AUTH_TIMESTAMP_ID,
    NS_AUTENTICACION, NS_DESCARGA, NS_SOAP_ENVELOPE, NS_WSS_SECEXT, NS_WSS_UTILITY, NS_XMLDSIG,
    WSS_BASE64_BINARY, WSS_X509_V3,
};
use crate::domain::crypto::{CanonicalMessage, DigestValue};
use crate::domain::operation::{
    AuthenticateParams, IssuerSerial, Operation, OperationKind, SignatureParts,
};
use crate::infra::error::{RequestError, RequestResult};

/// Deterministic producer of the texts digested, signed and sent.
pub trait CanonicalMessageBuilder {
    /// First-stage message: the operation's parameters only.
    fn digest_message(&self, operation: &Operation) -> RequestResult<CanonicalMessage>;

    /// Second-stage message: the `SignedInfo` envelope around `digest`.
    fn signed_info(
        &self,
        kind: OperationKind,
        digest: &DigestValue,
    ) -> RequestResult<CanonicalMessage>;

    /// Final request payload.
    fn signed_request(
        &self,
        operation: &Operation,
        parts: &SignatureParts<'_>,
    ) -> RequestResult<String>;
}

/// Message templates of the bulk download web service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SatMessageBuilder;

impl CanonicalMessageBuilder for SatMessageBuilder {
    fn digest_message(&self, operation: &Operation) -> RequestResult<CanonicalMessage> {
        let text = match operation {
            Operation::Authenticate(params) => {
                format!(
                    "<u:Timestamp xmlns:u=\"{NS_WSS_UTILITY}\" u:Id=\"{AUTH_TIMESTAMP_ID}\">{}</u:Timestamp>",
                    timestamp_children(params)
                )
            }
            _ => {
                let (outer, inner) = solicitation_elements(operation.kind());
                format!(
                    "<{outer} xmlns:des=\"{NS_DESCARGA}\"><{inner}{}></{inner}></{outer}>",
                    render_attributes(&solicitation_attributes(operation)?)
                )
            }
        };
        Ok(CanonicalMessage::new(text))
    }

    fn signed_info(
        &self,
        kind: OperationKind,
        digest: &DigestValue,
    ) -> RequestResult<CanonicalMessage> {
        let (uri, transform) = match kind {
            OperationKind::Authenticate => (format!("#{AUTH_TIMESTAMP_ID}"), ALG_EXC_C14N),
            _ => (String::new(), ALG_ENVELOPED_SIGNATURE),
        };
        Ok(CanonicalMessage::new(format!(
            "<SignedInfo xmlns=\"{NS_XMLDSIG}\">\
             <CanonicalizationMethod Algorithm=\"{ALG_EXC_C14N}\"></CanonicalizationMethod>\
             <SignatureMethod Algorithm=\"{ALG_RSA_SHA256}\"></SignatureMethod>\
             <Reference URI=\"{uri}\">\
             <Transforms><Transform Algorithm=\"{transform}\"></Transform></Transforms>\
             <DigestMethod Algorithm=\"{ALG_SHA256}\"></DigestMethod>\
             <DigestValue>{digest}</DigestValue>\
             </Reference>\
             </SignedInfo>"
        )))
    }

    fn signed_request(
        &self,
        operation: &Operation,
        parts: &SignatureParts<'_>,
    ) -> RequestResult<String> {
        let kind = operation.kind();
        let signed_info = self.signed_info(kind, parts.digest)?;

        match operation {
            Operation::Authenticate(params) => {
                let token_id = format!("uuid-{}-1", params.request_id);
                let key_info = format!(
                    "<KeyInfo><o:SecurityTokenReference>\
                     <o:Reference ValueType=\"{WSS_X509_V3}\" URI=\"#{token_id}\"></o:Reference>\
                     </o:SecurityTokenReference></KeyInfo>"
                );
                Ok(format!(
                    "<s:Envelope xmlns:s=\"{NS_SOAP_ENVELOPE}\" xmlns:u=\"{NS_WSS_UTILITY}\">\
                     <s:Header>\
                     <o:Security xmlns:o=\"{NS_WSS_SECEXT}\" s:mustUnderstand=\"1\">\
                     <u:Timestamp u:Id=\"{AUTH_TIMESTAMP_ID}\">{}</u:Timestamp>\
                     <o:BinarySecurityToken u:Id=\"{token_id}\" ValueType=\"{WSS_X509_V3}\" EncodingType=\"{WSS_BASE64_BINARY}\">{}</o:BinarySecurityToken>\
                     {}\
                     </o:Security>\
                     </s:Header>\
                     <s:Body><Autentica xmlns=\"{NS_AUTENTICACION}\"></Autentica></s:Body>\
                     </s:Envelope>",
                    timestamp_children(params),
                    parts.certificate_base64,
                    signature_element(&signed_info, parts, &key_info),
                ))
            }
            _ => {
                let issuer = parts.issuer_serial.ok_or_else(|| {
                    RequestError::CanonicalMessageBuildFailed(format!(
                        "{kind} request requires the certificate issuer and serial number"
                    ))
                })?;
                let key_info = x509_key_info(issuer, parts.certificate_base64);
                let (outer, inner) = solicitation_elements(kind);
                Ok(format!(
                    "<s:Envelope xmlns:s=\"{NS_SOAP_ENVELOPE}\" xmlns:des=\"{NS_DESCARGA}\" xmlns:xd=\"{NS_XMLDSIG}\">\
                     <s:Header></s:Header>\
                     <s:Body><{outer}><{inner}{}>{}</{inner}></{outer}></s:Body>\
                     </s:Envelope>",
                    render_attributes(&solicitation_attributes(operation)?),
                    signature_element(&signed_info, parts, &key_info),
                ))
            }
        }
    }
}

fn timestamp_children(params: &AuthenticateParams) -> String {
    format!(
        "<u:Created>{}</u:Created><u:Expires>{}</u:Expires>",
        escape_text(params.window.created()),
        escape_text(params.window.expires())
    )
}

fn signature_element(
    signed_info: &CanonicalMessage,
    parts: &SignatureParts<'_>,
    key_info: &str,
) -> String {
    format!(
        "<Signature xmlns=\"{NS_XMLDSIG}\">{}<SignatureValue>{}</SignatureValue>{key_info}</Signature>",
        signed_info.as_str(),
        parts.signature
    )
}

fn x509_key_info(issuer: IssuerSerial<'_>, certificate_base64: &str) -> String {
    format!(
        "<KeyInfo><X509Data>\
         <X509IssuerSerial>\
         <X509IssuerName>{}</X509IssuerName>\
         <X509SerialNumber>{}</X509SerialNumber>\
         </X509IssuerSerial>\
         <X509Certificate>{certificate_base64}</X509Certificate>\
         </X509Data></KeyInfo>",
        escape_text(issuer.issuer_dn),
        escape_text(issuer.serial_number)
    )
}

/// Outer and inner element of the three non-authentication requests.
/// Authentication has no solicitation; callers branch on it first.
fn solicitation_elements(kind: OperationKind) -> (&'static str, &'static str) {
    match kind {
        OperationKind::Query => ("des:SolicitaDescarga", "des:solicitud"),
        OperationKind::Verify => ("des:VerificaSolicitudDescarga", "des:solicitud"),
        OperationKind::Download | OperationKind::Authenticate => (
            "des:PeticionDescargaMasivaTercerosEntrada",
            "des:peticionDescarga",
        ),
    }
}

/// Attributes of the inner element, already in C14N (sorted) order.
fn solicitation_attributes(operation: &Operation) -> RequestResult<Vec<(&'static str, String)>> {
    let attributes = match operation {
        Operation::Authenticate(_) => Vec::new(),
        Operation::Query(params) => vec![
            ("FechaFinal", required("FechaFinal", &params.date_to)?),
            ("FechaInicial", required("FechaInicial", &params.date_from)?),
            ("RfcEmisor", params.issuer_rfc.to_string()),
            ("RfcSolicitante", params.issuer_rfc.to_string()),
            ("TipoSolicitud", params.request_type.to_string()),
        ],
        Operation::Verify(params) => vec![
            ("IdSolicitud", required("IdSolicitud", &params.request_id)?),
            ("RfcSolicitante", params.issuer_rfc.to_string()),
        ],
        Operation::Download(params) => vec![
            ("IdPaquete", required("IdPaquete", &params.package_id)?),
            ("RfcSolicitante", params.issuer_rfc.to_string()),
        ],
    };
    Ok(attributes)
}

fn required(name: &str, value: &str) -> RequestResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::CanonicalMessageBuildFailed(format!(
            "{name} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn render_attributes(attributes: &[(&'static str, String)]) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!(" {name}=\"{}\"", escape_attribute(value)))
        .collect()
}

/// C14N escaping for attribute values.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

/// C14N escaping for text nodes.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crypto::SignatureValue;
    use crate::domain::operation::{DownloadParams, QueryParams, VerifyParams};
    use crate::domain::types::{AuthenticationWindow, RequestType, Rfc};
    use uuid::Uuid;

    fn rfc() -> Rfc {
        Rfc::new("AAA010101AAA").unwrap()
    }

    fn query() -> Operation {
        Operation::Query(QueryParams {
            date_from: "2023-01-01T00:00:00".to_string(),
            date_to: "2023-01-31T23:59:59".to_string(),
            issuer_rfc: rfc(),
            request_type: RequestType::Cfdi,
        })
    }

    fn digest() -> DigestValue {
        DigestValue::from_sha256(&[7u8; 32])
    }

    #[test]
    fn query_digest_message_is_canonical() {
        let message = SatMessageBuilder.digest_message(&query()).unwrap();
        assert_eq!(
            message.as_str(),
            "<des:SolicitaDescarga xmlns:des=\"http://DescargaMasivaTerceros.sat.gob.mx\">\
             <des:solicitud FechaFinal=\"2023-01-31T23:59:59\" FechaInicial=\"2023-01-01T00:00:00\" \
             RfcEmisor=\"AAA010101AAA\" RfcSolicitante=\"AAA010101AAA\" TipoSolicitud=\"CFDI\">\
             </des:solicitud></des:SolicitaDescarga>"
        );
    }

    #[test]
    fn verify_and_download_digest_messages() {
        let verify = Operation::Verify(VerifyParams {
            issuer_rfc: rfc(),
            request_id: "4e80345d-917f-40bb-a98f-4a73939343c5".to_string(),
        });
        assert_eq!(
            SatMessageBuilder.digest_message(&verify).unwrap().as_str(),
            "<des:VerificaSolicitudDescarga xmlns:des=\"http://DescargaMasivaTerceros.sat.gob.mx\">\
             <des:solicitud IdSolicitud=\"4e80345d-917f-40bb-a98f-4a73939343c5\" RfcSolicitante=\"AAA010101AAA\">\
             </des:solicitud></des:VerificaSolicitudDescarga>"
        );

        let download = Operation::Download(DownloadParams {
            issuer_rfc: rfc(),
            package_id: "4E80345D-917F-40BB-A98F-4A73939343C5_01".to_string(),
        });
        let text = SatMessageBuilder.digest_message(&download).unwrap();
        assert!(text
            .as_str()
            .starts_with("<des:PeticionDescargaMasivaTercerosEntrada xmlns:des="));
        assert!(text.as_str().contains(
            "<des:peticionDescarga IdPaquete=\"4E80345D-917F-40BB-A98F-4A73939343C5_01\" RfcSolicitante=\"AAA010101AAA\">"
        ));
    }

    #[test]
    fn authenticate_digest_message_is_the_timestamp() {
        let op = Operation::Authenticate(AuthenticateParams {
            request_id: Uuid::nil(),
            window: AuthenticationWindow::new("2023-01-01T12:00:00.000Z", "2023-01-01T12:05:00.000Z")
                .unwrap(),
        });
        assert_eq!(
            SatMessageBuilder.digest_message(&op).unwrap().as_str(),
            "<u:Timestamp xmlns:u=\"http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd\" u:Id=\"_0\">\
             <u:Created>2023-01-01T12:00:00.000Z</u:Created><u:Expires>2023-01-01T12:05:00.000Z</u:Expires>\
             </u:Timestamp>"
        );
    }

    #[test]
    fn signed_info_embeds_digest_and_reference() {
        let d = digest();
        let auth = SatMessageBuilder
            .signed_info(OperationKind::Authenticate, &d)
            .unwrap();
        assert!(auth.as_str().contains("<Reference URI=\"#_0\">"));
        assert!(auth
            .as_str()
            .contains(&format!("<DigestValue>{d}</DigestValue>")));

        let query = SatMessageBuilder.signed_info(OperationKind::Query, &d).unwrap();
        assert!(query.as_str().contains("<Reference URI=\"\">"));
        assert!(query.as_str().contains(ALG_ENVELOPED_SIGNATURE));
    }

    #[test]
    fn signed_info_has_no_inter_element_whitespace() {
        let text = SatMessageBuilder
            .signed_info(OperationKind::Verify, &digest())
            .unwrap();
        assert!(!text.as_str().contains(">\n"));
        assert!(!text.as_str().contains("> <"));
    }

    #[test]
    fn signed_request_requires_issuer_serial_outside_authentication() {
        let d = digest();
        let sig = SignatureValue::from_bytes(&[1, 2, 3]);
        let parts = SignatureParts {
            certificate_base64: "MIIB",
            issuer_serial: None,
            digest: &d,
            signature: &sig,
        };
        let err = SatMessageBuilder.signed_request(&query(), &parts).unwrap_err();
        assert!(matches!(err, RequestError::CanonicalMessageBuildFailed(_)));
    }

    #[test]
    fn signed_query_request_carries_key_info() {
        let d = digest();
        let sig = SignatureValue::from_bytes(&[1, 2, 3]);
        let parts = SignatureParts {
            certificate_base64: "MIIB",
            issuer_serial: Some(IssuerSerial {
                issuer_dn: "CN=AC UAT,O=SAT & Co",
                serial_number: "292233162870206001759766198444326234574038512436",
            }),
            digest: &d,
            signature: &sig,
        };
        let payload = SatMessageBuilder.signed_request(&query(), &parts).unwrap();
        assert!(payload.contains("<X509IssuerName>CN=AC UAT,O=SAT &amp; Co</X509IssuerName>"));
        assert!(payload.contains(
            "<X509SerialNumber>292233162870206001759766198444326234574038512436</X509SerialNumber>"
        ));
        assert!(payload.contains("<X509Certificate>MIIB</X509Certificate>"));
        assert!(payload.contains("<SignatureValue>AQID</SignatureValue>"));
        assert!(payload.contains(&format!("<DigestValue>{d}</DigestValue>")));
    }

    #[test]
    fn empty_parameters_are_rejected() {
        let op = Operation::Download(DownloadParams {
            issuer_rfc: rfc(),
            package_id: "  ".to_string(),
        });
        assert!(matches!(
            SatMessageBuilder.digest_message(&op),
            Err(RequestError::CanonicalMessageBuildFailed(_))
        ));
    }

    #[test]
    fn escaping_follows_c14n() {
        assert_eq!(escape_attribute("a&b<c\"d\te"), "a&amp;b&lt;c&quot;d&#x9;e");
        assert_eq!(escape_attribute("x>y"), "x>y");
        assert_eq!(escape_text("a&b<c>d\"e"), "a&amp;b&lt;c&gt;d\"e");
    }
}
