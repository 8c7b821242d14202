//! SOAP over HTTP adapter for the bulk download web services.
//!
//! Posts signed payloads and hands the raw response body back to the
//! caller. Responses are not parsed here.

use crate::domain::constants::{ACTION_AUTHENTICATE, ACTION_DOWNLOAD, ACTION_QUERY, ACTION_VERIFY};
use crate::domain::operation::{OperationKind, SignedRequest};
use crate::domain::types::AccessToken;
use crate::infra::config::{DescargaConfiguration, EndpointConfig};
use crate::infra::error::{RequestError, RequestResult};
use std::time::Duration;

/// Something that can deliver a signed request and return the response body.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(
        &self,
        request: &SignedRequest,
        token: Option<&AccessToken>,
    ) -> RequestResult<String>;
}

/// Configuration for HTTP delivery.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoints: EndpointConfig,
    pub timeout: Duration,
    pub retry_attempts: usize,
    pub retry_delay: Duration,
}

impl From<&DescargaConfiguration> for TransportConfig {
    fn from(cfg: &DescargaConfiguration) -> Self {
        Self {
            endpoints: cfg.endpoints.clone(),
            timeout: Duration::from_secs(cfg.network_timeout_seconds),
            retry_attempts: cfg.retry_attempts.max(1),
            retry_delay: Duration::from_millis(cfg.retry_delay_millis),
        }
    }
}

/// SOAPAction header value for each operation.
#[must_use]
pub fn soap_action(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Authenticate => ACTION_AUTHENTICATE,
        OperationKind::Query => ACTION_QUERY,
        OperationKind::Verify => ACTION_VERIFY,
        OperationKind::Download => ACTION_DOWNLOAD,
    }
}

/// reqwest based transport.
pub struct HttpTransport {
    cfg: TransportConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: TransportConfig) -> RequestResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(concat!("descarga-signer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { cfg, http })
    }

    #[must_use]
    pub fn endpoint(&self, kind: OperationKind) -> &str {
        self.cfg.endpoints.for_operation(kind)
    }

    async fn post_with_retries(
        &self,
        request: &SignedRequest,
        authorization: Option<&str>,
    ) -> RequestResult<String> {
        let kind = request.kind();
        let attempts = self.cfg.retry_attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            log::debug!(
                "{kind} http attempt {attempt} of {attempts} -> {}",
                self.endpoint(kind)
            );
            match self.single_post(request, authorization).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    log::warn!("{kind} attempt {attempt} failed: {e}");
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.cfg.retry_delay).await;
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| RequestError::TransportError(format!("{kind} was never sent"))))
    }

    async fn single_post(
        &self,
        request: &SignedRequest,
        authorization: Option<&str>,
    ) -> RequestResult<String> {
        let kind = request.kind();
        let url = self.endpoint(kind);
        let mut builder = self
            .http
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action(kind))
            .body(request.payload().to_string());
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| RequestError::TransportError(format!("HTTP error: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RequestError::TransportError(format!("Read body failed: {e}")))?;
        if !status.is_success() {
            log::debug!("{kind} error response body: {body}");
            return Err(RequestError::TransportError(format!(
                "HTTP {status} from {url}"
            )));
        }
        log::info!("{kind} response received ({} bytes)", body.len());
        Ok(body)
    }
}

fn authorization_for(
    kind: OperationKind,
    token: Option<&AccessToken>,
) -> RequestResult<Option<String>> {
    if !kind.requires_token() {
        return Ok(None);
    }
    token
        .map(|t| Some(t.authorization_header()))
        .ok_or_else(|| {
            RequestError::TransportError(format!("{kind} requires an access token"))
        })
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &SignedRequest,
        token: Option<&AccessToken>,
    ) -> RequestResult<String> {
        let authorization = authorization_for(request.kind(), token)?;
        self.post_with_retries(request, authorization.as_deref())
            .await
    }
}
