//! Certificate validation service.
//!
//! Decodes the caller's certificate, extracts the identity fields signed
//! requests embed and refuses certificate authorities.

use der::oid::AssociatedOid;
use der::{Decode, Encode};
use openssl::bn::BigNum;
use openssl::x509::X509;
use x509_cert::ext::pkix::BasicConstraints;

use crate::domain::crypto::{Certificate, SerialNumber};
use crate::infra::error::{RequestError, RequestResult};

const PEM_PREFIX: &[u8] = b"-----BEGIN";

pub struct CertificateValidator;

impl CertificateValidator {
    /// Decode `certificate_bytes` (DER, or PEM) into a validated end-entity certificate.
    pub fn validate(certificate_bytes: &[u8]) -> RequestResult<Certificate> {
        if certificate_bytes.is_empty() {
            return Err(RequestError::MalformedCertificate(
                "certificate input is empty".to_string(),
            ));
        }

        let der = Self::to_der(certificate_bytes)?;
        let parsed = x509_cert::Certificate::from_der(&der)?;
        let tbs = &parsed.tbs_certificate;
        let issuer_dn = tbs.issuer.to_string();

        let constraints = Self::basic_constraints(&parsed)?;
        if constraints.as_ref().is_some_and(|bc| bc.ca) {
            log::warn!("Rejecting certificate authority issued by {issuer_dn}");
            return Err(RequestError::CertificateIsAuthority { issuer: issuer_dn });
        }

        let serial_decimal = Self::serial_to_decimal(tbs.serial_number.as_bytes())?;
        let public_key = tbs.subject_public_key_info.to_der()?;

        let certificate = Certificate::new(
            der,
            issuer_dn,
            tbs.subject.to_string(),
            SerialNumber::new(serial_decimal),
            public_key,
        );

        log::debug!("Certificate issuer: {}", certificate.issuer_dn());
        log::debug!("Certificate serial: {}", certificate.serial_number());
        log::debug!("Certificate fingerprint: {}", certificate.fingerprint_hex());
        Ok(certificate)
    }

    fn to_der(certificate_bytes: &[u8]) -> RequestResult<Vec<u8>> {
        if !certificate_bytes.starts_with(PEM_PREFIX) {
            return Ok(certificate_bytes.to_vec());
        }
        X509::from_pem(certificate_bytes)
            .and_then(|cert| cert.to_der())
            .map_err(|e| RequestError::MalformedCertificate(format!("invalid PEM certificate: {e}")))
    }

    /// Basic constraints extension, if the certificate carries one.
    fn basic_constraints(
        certificate: &x509_cert::Certificate,
    ) -> RequestResult<Option<BasicConstraints>> {
        let Some(extensions) = &certificate.tbs_certificate.extensions else {
            return Ok(None);
        };
        for ext in extensions {
            if ext.extn_id == BasicConstraints::OID {
                let constraints = BasicConstraints::from_der(ext.extn_value.as_bytes())?;
                return Ok(Some(constraints));
            }
        }
        Ok(None)
    }

    /// Decimal rendering of a DER INTEGER body (big-endian two's complement).
    fn serial_to_decimal(serial_bytes: &[u8]) -> RequestResult<String> {
        let invalid = |e: openssl::error::ErrorStack| {
            RequestError::MalformedCertificate(format!("invalid serial number: {e}"))
        };

        let negative = serial_bytes.first().is_some_and(|b| b & 0x80 != 0);
        let serial = if negative {
            // magnitude = !bytes + 1
            let inverted: Vec<u8> = serial_bytes.iter().map(|b| !b).collect();
            let mut magnitude = BigNum::from_slice(&inverted).map_err(invalid)?;
            magnitude.add_word(1).map_err(invalid)?;
            magnitude.set_negative(true);
            magnitude
        } else {
            BigNum::from_slice(serial_bytes).map_err(invalid)?
        };
        let decimal = serial.to_dec_str().map_err(invalid)?;
        Ok(decimal.to_string())
    }
}
