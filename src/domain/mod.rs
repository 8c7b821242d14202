//! Domain layer: request parameters, protocol constants and the
//! cryptographic value types they are signed with.

pub mod constants;
pub mod crypto;
pub mod operation;
pub mod types;
