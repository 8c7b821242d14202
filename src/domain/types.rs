//! Type-safe wrappers for request parameters.
//!
//! New-type wrappers validate taxpayer ids, request types and the
//! authentication window before they reach the message builder.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::infra::error::{RequestError, RequestResult};

/// Taxpayer id (RFC). 12 characters for legal entities, 13 for individuals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rfc(String);

impl Rfc {
    /// Validate and normalise to upper case.
    pub fn new(rfc: impl AsRef<str>) -> RequestResult<Self> {
        let rfc = rfc.as_ref().trim().to_uppercase();
        Self::validate(&rfc)?;
        Ok(Rfc(rfc))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(rfc: &str) -> RequestResult<()> {
        let len = rfc.chars().count();
        if len != 12 && len != 13 {
            return Err(RequestError::CanonicalMessageBuildFailed(format!(
                "RFC must be 12 or 13 characters, got {len}"
            )));
        }
        if !rfc
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '&' || c == 'Ñ')
        {
            return Err(RequestError::CanonicalMessageBuildFailed(format!(
                "RFC contains invalid characters: {rfc}"
            )));
        }
        Ok(())
    }
}

impl FromStr for Rfc {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Rfc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a bulk download query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestType {
    /// Full XML invoices.
    #[default]
    Cfdi,
    /// Metadata listing only.
    Metadata,
}

impl RequestType {
    /// Value of the `TipoSolicitud` attribute.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Cfdi => "CFDI",
            RequestType::Metadata => "Metadata",
        }
    }
}

impl FromStr for RequestType {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cfdi" => Ok(RequestType::Cfdi),
            "metadata" => Ok(RequestType::Metadata),
            other => Err(RequestError::CanonicalMessageBuildFailed(format!(
                "Unknown request type: {other}"
            ))),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Created/expires instants of an authentication request, as protocol text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationWindow {
    created: String,
    expires: String,
}

impl AuthenticationWindow {
    /// Use caller supplied timestamps verbatim.
    pub fn new(created: impl Into<String>, expires: impl Into<String>) -> RequestResult<Self> {
        let created = created.into();
        let expires = expires.into();
        if created.trim().is_empty() || expires.trim().is_empty() {
            return Err(RequestError::CanonicalMessageBuildFailed(
                "Authentication window requires both created and expires".to_string(),
            ));
        }
        Ok(Self { created, expires })
    }

    /// Window opening at `start` and lasting `lifetime`.
    pub fn starting_at(start: DateTime<Utc>, lifetime: Duration) -> RequestResult<Self> {
        if lifetime <= Duration::zero() {
            return Err(RequestError::CanonicalMessageBuildFailed(
                "Authentication lifetime must be positive".to_string(),
            ));
        }
        let expires = start + lifetime;
        Self::new(
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            expires.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    pub fn starting_now(lifetime: Duration) -> RequestResult<Self> {
        Self::starting_at(Utc::now(), lifetime)
    }

    #[must_use]
    pub fn created(&self) -> &str {
        &self.created
    }
    #[must_use]
    pub fn expires(&self) -> &str {
        &self.expires
    }
}

/// Token returned by the authentication service, sent with every later call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> RequestResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(RequestError::TransportError(
                "Access token must not be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("WRAP access_token=\"{}\"", self.0)
    }
}

// Tokens grant access to the taxpayer's invoices; keep them out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}
