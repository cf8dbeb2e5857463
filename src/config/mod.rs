//! Configuration module for Tollgate.
//!
//! Provides layered configuration loading from files, environment
//! variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`TOLLGATE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! Secrets (store service key, model API key, media signing secret,
//! payment key secret, OAuth client secret) are only accepted from the
//! environment and are never written back when rendering a config file.

pub mod cache;
pub mod error;
pub mod genai;
pub mod logging;
pub mod media;
pub mod oauth;
pub mod payment;
pub mod server;
pub mod store;

pub use cache::CacheConfig;
pub use error::ConfigError;
pub use genai::GenAiConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use media::MediaConfig;
pub use oauth::OAuthConfig;
pub use payment::PaymentConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Tollgate server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TollgateConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub genai: GenAiConfig,
    pub media: MediaConfig,
    pub payment: PaymentConfig,
    pub oauth: OAuthConfig,
    pub logging: LoggingConfig,
}

impl TollgateConfig {
    /// Load configuration from a TOML file.
    ///
    /// If path is None, returns default configuration. If the path
    /// doesn't exist, returns NotFound.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("TOLLGATE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("TOLLGATE_HOST") {
            self.server.host = host;
        }
        if let Ok(level) = std::env::var("TOLLGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TOLLGATE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(url) = std::env::var("TOLLGATE_STORE_URL") {
            self.store.url = url;
            self.store.backend = StoreBackend::Rest;
        }
        if let Ok(key) = std::env::var("TOLLGATE_STORE_KEY") {
            self.store.service_key = key;
        }
        if let Ok(key) = std::env::var("TOLLGATE_GENAI_API_KEY") {
            self.genai.api_key = key;
        }
        if let Ok(secret) = std::env::var("TOLLGATE_MEDIA_API_SECRET") {
            self.media.api_secret = secret;
        }
        if let Ok(key_id) = std::env::var("TOLLGATE_PAYMENT_KEY_ID") {
            self.payment.key_id = key_id;
        }
        if let Ok(secret) = std::env::var("TOLLGATE_PAYMENT_KEY_SECRET") {
            self.payment.key_secret = secret;
        }
        if let Ok(client_id) = std::env::var("TOLLGATE_OAUTH_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }
        if let Ok(secret) = std::env::var("TOLLGATE_OAUTH_CLIENT_SECRET") {
            self.oauth.client_secret = secret;
        }

        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.store.backend == StoreBackend::Rest && self.store.url.is_empty() {
            return Err(ConfigError::Validation {
                field: "store.url".to_string(),
                message: "rest backend requires a store URL".to_string(),
            });
        }
        if self.genai.poll_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "genai.poll_interval_seconds".to_string(),
                message: "poll interval must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
