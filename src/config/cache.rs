//! Cache TTL configuration.

use serde::{Deserialize, Serialize};

/// TTLs for the cache-aside layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// API-key record TTL.
    pub key_ttl_seconds: u64,
    /// Dashboard aggregate TTL.
    pub dashboard_ttl_seconds: u64,
    /// Generated-image (per-prompt) TTL.
    pub image_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_ttl_seconds: 3600,
            dashboard_ttl_seconds: 300,
            image_ttl_seconds: 86_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.key_ttl_seconds, 3600);
        assert_eq!(config.dashboard_ttl_seconds, 300);
        assert_eq!(config.image_ttl_seconds, 86_400);
    }
}
