//! Configuration management infrastructure.
//!
//! Persists service endpoints, transport settings and CLI defaults as TOML.
//! The signing pipeline itself is configuration free.

use crate::domain::constants::{
    DEFAULT_TOKEN_LIFETIME_MINUTES, ENDPOINT_AUTHENTICATE, ENDPOINT_DOWNLOAD, ENDPOINT_QUERY,
    ENDPOINT_VERIFY,
};
use crate::domain::operation::OperationKind;
use crate::domain::types::RequestType;
use crate::infra::error::{RequestError, RequestResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescargaConfiguration {
    /// Web service endpoints
    pub endpoints: EndpointConfig,

    /// Network timeout settings
    pub network_timeout_seconds: u64,

    /// Number of attempts per request
    pub retry_attempts: usize,

    /// Pause between attempts
    pub retry_delay_millis: u64,

    /// Lifetime of the authentication window
    pub token_lifetime_minutes: i64,

    /// Request type used when the CLI is not told otherwise
    pub default_request_type: String,

    /// Environment variable holding the private key passphrase
    pub passphrase_env_var: String,
}

/// One URL per web service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub authentication: String,
    pub query: String,
    pub verification: String,
    pub download: String,
}

impl EndpointConfig {
    #[must_use]
    pub fn for_operation(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Authenticate => &self.authentication,
            OperationKind::Query => &self.query,
            OperationKind::Verify => &self.verification,
            OperationKind::Download => &self.download,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            authentication: ENDPOINT_AUTHENTICATE.to_string(),
            query: ENDPOINT_QUERY.to_string(),
            verification: ENDPOINT_VERIFY.to_string(),
            download: ENDPOINT_DOWNLOAD.to_string(),
        }
    }
}

impl Default for DescargaConfiguration {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            network_timeout_seconds: 30,
            retry_attempts: 1,
            retry_delay_millis: 1000,
            token_lifetime_minutes: DEFAULT_TOKEN_LIFETIME_MINUTES,
            default_request_type: RequestType::Cfdi.to_string(),
            passphrase_env_var: "SAT_KEY_PASSPHRASE".to_string(),
        }
    }
}

impl DescargaConfiguration {
    pub fn request_type(&self) -> RequestResult<RequestType> {
        self.default_request_type.parse().map_err(|_| {
            RequestError::ConfigurationError(format!(
                "Invalid default request type: {}",
                self.default_request_type
            ))
        })
    }

    #[must_use]
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_lifetime_minutes)
    }

    /// Validate configuration values
    pub fn validate(&self) -> RequestResult<()> {
        for kind in OperationKind::ALL {
            validate_endpoint(kind, self.endpoints.for_operation(kind))?;
        }

        if self.network_timeout_seconds == 0 {
            return Err(RequestError::ConfigurationError(
                "Network timeout must be greater than 0".to_string(),
            ));
        }

        if self.retry_attempts == 0 {
            return Err(RequestError::ConfigurationError(
                "Retry attempts must be greater than 0".to_string(),
            ));
        }

        if self.token_lifetime_minutes <= 0 {
            return Err(RequestError::ConfigurationError(
                "Token lifetime must be greater than 0".to_string(),
            ));
        }

        self.request_type()?;

        if self.passphrase_env_var.trim().is_empty() {
            return Err(RequestError::ConfigurationError(
                "Passphrase environment variable name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_endpoint(kind: OperationKind, url: &str) -> RequestResult<()> {
    let Some(host) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return Err(RequestError::ConfigurationError(format!(
            "{kind} endpoint must start with http:// or https://, got: {url}"
        )));
    };
    if !host.contains('.') {
        return Err(RequestError::ConfigurationError(format!(
            "{kind} endpoint must contain a valid domain: {url}"
        )));
    }
    Ok(())
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("descarga-signer").join("config.toml")
        } else {
            PathBuf::from("descarga-signer-config.toml")
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> RequestResult<DescargaConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = DescargaConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file, falling back to defaults without writing
    pub fn load_or_default(&self) -> RequestResult<DescargaConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(DescargaConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> RequestResult<DescargaConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            RequestError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: DescargaConfiguration = toml::from_str(&content).map_err(|e| {
            RequestError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &DescargaConfiguration) -> RequestResult<()> {
        config.validate()?;
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RequestError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            RequestError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            RequestError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
