//! High-level workflows composed from services.

pub mod request;
