//! Media host configuration.

use serde::{Deserialize, Serialize};

/// Cloudinary-style media host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    /// Upload signing secret; normally supplied via `TOLLGATE_MEDIA_API_SECRET`.
    #[serde(skip_serializing)]
    pub api_secret: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}
