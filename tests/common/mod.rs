//! Shared fixtures for integration tests.
//!
//! No real e.firma material ships with the repository; certificates and
//! encrypted keys are generated with OpenSSL at test time and cached per
//! test binary.

#![allow(dead_code)]

use std::sync::OnceLock;

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509Builder, X509NameBuilder};

pub const PASSPHRASE: &str = "12345678a";

/// 20-byte serial in the shape the tax authority issues.
pub const SERIAL_DECIMAL: &str = "292233162870206001759766198444326234574038512436";

pub const ISSUER_CN: &str = "AC UAT";

/// Certificate in both encodings plus its encrypted key.
pub struct Fixture {
    pub certificate_der: Vec<u8>,
    pub certificate_pem: Vec<u8>,
    pub encrypted_key: Vec<u8>,
}

fn generate_key() -> PKey<Private> {
    let rsa = Rsa::generate(2048).expect("Should generate RSA key");
    PKey::from_rsa(rsa).expect("Should create PKey")
}

fn encrypt(pkey: &PKey<Private>, passphrase: &str) -> Vec<u8> {
    pkey.private_key_to_pkcs8_passphrase(Cipher::aes_256_cbc(), passphrase.as_bytes())
        .expect("Should encrypt PKCS#8 key")
}

fn build_fixture(authority: bool) -> Fixture {
    let pkey = generate_key();

    let mut name = X509NameBuilder::new().expect("Should create name builder");
    name.append_entry_by_text("C", "MX").expect("Should add C");
    name.append_entry_by_text("O", "SERVICIO DE ADMINISTRACION TRIBUTARIA")
        .expect("Should add O");
    name.append_entry_by_text("CN", ISSUER_CN)
        .expect("Should add CN");
    let name = name.build();

    let mut builder = X509Builder::new().expect("Should create X509 builder");
    builder.set_version(2).expect("Should set version");
    let serial = BigNum::from_dec_str(SERIAL_DECIMAL)
        .expect("Should create serial")
        .to_asn1_integer()
        .expect("Should convert serial");
    builder
        .set_serial_number(&serial)
        .expect("Should set serial");
    builder.set_subject_name(&name).expect("Should set subject");
    builder.set_issuer_name(&name).expect("Should set issuer");

    let not_before = Asn1Time::days_from_now(0).expect("Should create not_before");
    let not_after = Asn1Time::days_from_now(365).expect("Should create not_after");
    builder
        .set_not_before(&not_before)
        .expect("Should set not_before");
    builder
        .set_not_after(&not_after)
        .expect("Should set not_after");
    builder.set_pubkey(&pkey).expect("Should set pubkey");

    let constraints = if authority {
        BasicConstraints::new().critical().ca().build()
    } else {
        BasicConstraints::new().build()
    };
    let constraints = constraints.expect("Should build basic constraints");
    builder
        .append_extension(constraints)
        .expect("Should add basic constraints");

    builder
        .sign(&pkey, MessageDigest::sha256())
        .expect("Should sign");
    let certificate = builder.build();

    Fixture {
        certificate_der: certificate.to_der().expect("Should convert to DER"),
        certificate_pem: certificate.to_pem().expect("Should convert to PEM"),
        encrypted_key: encrypt(&pkey, PASSPHRASE),
    }
}

/// End-entity signing certificate and its key.
pub fn leaf() -> &'static Fixture {
    static LEAF: OnceLock<Fixture> = OnceLock::new();
    LEAF.get_or_init(|| build_fixture(false))
}

/// Certificate authority certificate and its key.
pub fn authority() -> &'static Fixture {
    static AUTHORITY: OnceLock<Fixture> = OnceLock::new();
    AUTHORITY.get_or_init(|| build_fixture(true))
}

/// Encrypted key unrelated to any fixture certificate.
pub fn unrelated_key() -> &'static [u8] {
    static KEY: OnceLock<Vec<u8>> = OnceLock::new();
    KEY.get_or_init(|| encrypt(&generate_key(), PASSPHRASE))
}

/// Text between the first `open` and the following `close`, exclusive.
pub fn between<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
    let start = text.find(open).expect("opening marker present") + open.len();
    let end = start + text[start..].find(close).expect("closing marker present");
    &text[start..end]
}

/// The complete `<SignedInfo ...>...</SignedInfo>` element of a payload.
pub fn signed_info_of(payload: &str) -> &str {
    const CLOSE: &str = "</SignedInfo>";
    let start = payload.find("<SignedInfo").expect("SignedInfo present");
    let end = start + payload[start..].find(CLOSE).expect("SignedInfo closed") + CLOSE.len();
    &payload[start..end]
}
