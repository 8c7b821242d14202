//! Centralized protocol literals: namespaces, algorithm identifiers, SOAP
//! actions and default service endpoints.
//! Keep this intentionally small; only broadly reused literals should live here.

// === XML namespaces ===

pub const NS_SOAP_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NS_XMLDSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const NS_WSS_UTILITY: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const NS_WSS_SECEXT: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const NS_DESCARGA: &str = "http://DescargaMasivaTerceros.sat.gob.mx";
pub const NS_AUTENTICACION: &str = "http://DescargaMasivaTerceros.gob.mx";

// === XML-DSig algorithm identifiers ===

pub const ALG_EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const ALG_ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const ALG_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ALG_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

// === WS-Security token profile ===

pub const WSS_X509_V3: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509v3";
pub const WSS_BASE64_BINARY: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// `u:Id` of the authentication timestamp; the SignedInfo reference points here.
pub const AUTH_TIMESTAMP_ID: &str = "_0";

// === SOAP actions ===

pub const ACTION_AUTHENTICATE: &str = "http://DescargaMasivaTerceros.gob.mx/IAutenticacion/Autentica";
pub const ACTION_QUERY: &str =
    "http://DescargaMasivaTerceros.sat.gob.mx/ISolicitaDescargaService/SolicitaDescarga";
pub const ACTION_VERIFY: &str =
    "http://DescargaMasivaTerceros.sat.gob.mx/IVerificaSolicitudDescargaService/VerificaSolicitudDescarga";
pub const ACTION_DOWNLOAD: &str =
    "http://DescargaMasivaTerceros.sat.gob.mx/IDescargaMasivaTercerosService/Descargar";

// === Default endpoints ===

pub const ENDPOINT_AUTHENTICATE: &str =
    "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/Autenticacion/Autenticacion.svc";
pub const ENDPOINT_QUERY: &str =
    "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/SolicitaDescargaService.svc";
pub const ENDPOINT_VERIFY: &str =
    "https://cfdidescargamasivasolicitud.clouda.sat.gob.mx/VerificaSolicitudDescargaService.svc";
pub const ENDPOINT_DOWNLOAD: &str =
    "https://cfdidescargamasiva.clouda.sat.gob.mx/DescargaMasivaService.svc";

/// Lifetime of an authentication window unless configured otherwise.
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 5;
