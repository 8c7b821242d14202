//! Adapter layer modules for external system integration.
//!
//! Provides the HTTP transport that delivers signed SOAP requests to the
//! bulk download web services.

pub mod http_transport;
