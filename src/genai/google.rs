//! Google Generative Language API client.
//!
//! Covers the four call shapes the console needs:
//! - `models/{model}:generateContent` for text
//! - `generateContent` with image/audio response modalities
//! - `generateContent` with a speech config for TTS (single or multi-speaker)
//! - `models/{model}:predictLongRunning` plus operation polling for video
//!
//! Authentication is a `key` query parameter on every request.

use super::error::GenAiError;
use super::types::{
    GenerateContentRequest, GenerateContentResponse, SpeechConfig, VideoGenerationRequest,
    VideoInstance, VideoOperation, VideoParameters,
};
use super::{wav, GenerativeModel, SpeechRequest};
use crate::config::GenAiConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the Google Generative Language REST API.
pub struct GoogleGenAi {
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    tts_model: String,
    music_model: String,
    video_model: String,
    poll_interval: Duration,
    client: Arc<Client>,
}

impl GoogleGenAi {
    pub fn new(config: &GenAiConfig, client: Arc<Client>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            tts_model: config.tts_model.clone(),
            music_model: config.music_model.clone(),
            video_model: config.video_model.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            client,
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenAiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenAiError::InvalidResponse(e.to_string()))
    }

    /// Pull the first inline-data part out of a response and decode it.
    fn decode_inline(
        response: &GenerateContentResponse,
        what: &'static str,
    ) -> Result<Vec<u8>, GenAiError> {
        let inline = response
            .first_inline_data()
            .ok_or(GenAiError::EmptyResult(what))?;
        BASE64
            .decode(&inline.data)
            .map_err(|e| GenAiError::InvalidResponse(format!("inline data: {}", e)))
    }
}

#[async_trait]
impl GenerativeModel for GoogleGenAi {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenAiError> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let response = self.generate_content(&self.text_model, &request).await?;
        response
            .first_text()
            .map(str::to_string)
            .ok_or(GenAiError::EmptyResult("response text"))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenAiError> {
        let request =
            GenerateContentRequest::from_prompt(prompt).with_modalities(&["TEXT", "IMAGE"]);
        let response = self.generate_content(&self.image_model, &request).await?;
        Self::decode_inline(&response, "image data")
    }

    async fn generate_speech(
        &self,
        prompt: &str,
        voices: &SpeechRequest,
    ) -> Result<Vec<u8>, GenAiError> {
        let speech = if voices.speakers.is_empty() {
            SpeechConfig::single(&voices.voice)
        } else {
            SpeechConfig::multi_speaker(&voices.speakers)
        };
        let request = GenerateContentRequest::from_prompt(prompt)
            .with_modalities(&["AUDIO"])
            .with_speech_config(speech);
        let response = self.generate_content(&self.tts_model, &request).await?;
        let pcm = Self::decode_inline(&response, "audio data")?;
        Ok(wav::wrap_pcm_default(&pcm))
    }

    async fn generate_music(&self, prompt: &str) -> Result<Vec<u8>, GenAiError> {
        let request = GenerateContentRequest::from_prompt(prompt).with_modalities(&["AUDIO"]);
        let response = self.generate_content(&self.music_model, &request).await?;
        let pcm = Self::decode_inline(&response, "audio data")?;
        Ok(wav::wrap_pcm_default(&pcm))
    }

    async fn generate_video(&self, prompt: &str) -> Result<Vec<u8>, GenAiError> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, self.video_model
        );
        let request = VideoGenerationRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
                person_generation: "dont_allow".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenAiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        let mut operation: VideoOperation = response
            .json()
            .await
            .map_err(|e| GenAiError::InvalidResponse(e.to_string()))?;
        info!(operation = %operation.name, "video generation started");

        // Poll the operation handle on a fixed interval until completion.
        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            let poll_url = format!("{}/v1beta/{}", self.base_url, operation.name);
            let response = self
                .client
                .get(&poll_url)
                .query(&[("key", &self.api_key)])
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(GenAiError::Upstream {
                    status: status.as_u16(),
                    message,
                });
            }
            operation = response
                .json()
                .await
                .map_err(|e| GenAiError::InvalidResponse(e.to_string()))?;
            debug!(operation = %operation.name, done = operation.done, "polled video operation");
        }

        let uri = operation
            .response
            .as_ref()
            .and_then(|r| r.generated_videos.first())
            .and_then(|v| v.video.as_ref())
            .map(|v| v.uri.clone())
            .ok_or(GenAiError::EmptyResult("video data"))?;

        // The produced URI already carries query parameters; the API key is
        // appended the same way the hosted download endpoint expects.
        let download_url = format!("{}&key={}", uri, self.api_key);
        let response = self.client.get(&download_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenAiError::Upstream {
                status: status.as_u16(),
                message: "video download failed".to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
