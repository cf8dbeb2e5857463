//! Generative model configuration.

use serde::{Deserialize, Serialize};

/// Model identifiers and endpoint for the generative backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    pub base_url: String,
    /// API key; normally supplied via `TOLLGATE_GENAI_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub tts_model: String,
    pub music_model: String,
    pub video_model: String,
    /// Default prebuilt voice for single-speaker TTS.
    pub default_voice: String,
    /// Fixed delay between video operation polls.
    pub poll_interval_seconds: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            text_model: "gemini-2.0-flash".to_string(),
            image_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            music_model: "lyria-002".to_string(),
            video_model: "veo-2.0-generate-001".to_string(),
            default_voice: "Kore".to_string(),
            poll_interval_seconds: 10,
        }
    }
}
