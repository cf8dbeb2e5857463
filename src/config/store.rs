//! Ledger store configuration.

use serde::{Deserialize, Serialize};

/// Which ledger store implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; state does not survive a restart.
    Memory,
    /// PostgREST-style HTTP facade over the relational store.
    Rest,
}

/// Ledger store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Base URL of the REST facade (required for the rest backend).
    pub url: String,
    /// Service key; normally supplied via `TOLLGATE_STORE_KEY`.
    #[serde(skip_serializing)]
    pub service_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: String::new(),
            service_key: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_defaults_to_memory() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert!(config.url.is_empty());
    }

    #[test]
    fn test_service_key_is_never_serialized() {
        let config = StoreConfig {
            service_key: "secret".into(),
            ..Default::default()
        };
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }
}
