//! Media host upload client.
//!
//! Generated binary assets (images, audio, video) are re-uploaded to a
//! Cloudinary-style media host and referenced by their hosted URL in the
//! prompt history. The host treats audio as a video resource.

use crate::config::MediaConfig;
use crate::signing::sha256_hex;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during a media upload.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Network connectivity error.
    #[error("media host network error: {0}")]
    Network(String),

    /// The media host rejected the upload (4xx, 5xx).
    #[error("media host error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upload succeeded but the response carried no URL.
    #[error("invalid media host response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::Network(err.to_string())
    }
}

/// Resource class on the media host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaResource {
    Image,
    /// Audio uploads also go through the video resource class.
    Video,
}

impl MediaResource {
    fn path_segment(self) -> &'static str {
        match self {
            MediaResource::Image => "image",
            MediaResource::Video => "video",
        }
    }
}

/// Seam over the media host; handlers hold it as `Arc<dyn MediaHost>`.
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    /// Upload an asset and return its hosted URL.
    async fn upload(
        &self,
        resource: MediaResource,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, MediaError>;
}

/// Signed-upload client for a Cloudinary-style media host.
pub struct CloudinaryHost {
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryHost {
    pub fn new(config: &MediaConfig, client: Arc<Client>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            client,
        }
    }

    /// Signature over the alphabetically ordered upload parameters plus
    /// the API secret, as the host's signed-upload contract requires.
    fn sign(&self, public_id: &str, timestamp: i64) -> String {
        let to_sign = format!("public_id={}&timestamp={}{}", public_id, timestamp, self.api_secret);
        sha256_hex(&to_sign)
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(
        &self,
        resource: MediaResource,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, MediaError> {
        let url = format!(
            "{}/v1_1/{}/{}/upload",
            self.base_url,
            self.cloud_name,
            resource.path_segment()
        );
        let timestamp = Utc::now().timestamp();
        let public_id = file_name.to_string();
        let signature = self.sign(&public_id, timestamp);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("public_id", public_id)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;
        Ok(body.secure_url)
    }
}
