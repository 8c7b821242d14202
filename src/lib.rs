//! Descarga Signer Library
//!
//! Builds and signs the SOAP requests of the SAT bulk invoice download web
//! services (authenticate, query, verify, download) with a taxpayer's
//! e.firma certificate and encrypted private key.
//!
//! ```no_run
//! use descarga_signer::{Passphrase, RequestWorkflow, SigningMaterial};
//!
//! # fn main() -> descarga_signer::RequestResult<()> {
//! let certificate = std::fs::read("fiel.cer")?;
//! let key = std::fs::read("fiel.key")?;
//! let passphrase = Passphrase::new("12345678a");
//!
//! let request = RequestWorkflow::default().query(
//!     "2023-01-01",
//!     "2023-01-31",
//!     "AAA010101AAA",
//!     "CFDI",
//!     SigningMaterial::new(&certificate, &key, &passphrase),
//! )?;
//! println!("{}", request.payload());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use adapters::http_transport::{HttpTransport, Transport, TransportConfig};
pub use domain::crypto::{Certificate, DigestValue, Passphrase, SignatureValue};
pub use domain::operation::{Operation, OperationKind, SignedRequest};
pub use domain::types::{AccessToken, AuthenticationWindow, RequestType, Rfc};
pub use infra::config::{ConfigManager, DescargaConfiguration};
pub use infra::error::{RequestError, RequestResult};
pub use pipelines::request::{RequestWorkflow, SigningMaterial};
pub use services::{
    CanonicalMessageBuilder, DigestProvider, RsaSha256Signer, SatMessageBuilder, Sha256Digest,
    SignatureProvider,
};
