//! Generative model abstraction.
//!
//! The console proxies five modalities to an externally hosted model
//! family. [`GenerativeModel`] is the seam the handlers are written
//! against; [`GoogleGenAi`] is the production implementation over the
//! Google Generative Language REST API.

pub mod dispatch;
pub mod error;
pub mod google;
pub mod types;
pub mod wav;

pub use dispatch::{classify, resolve, GenerationKind, MULTI_SPEAKER_MARKER};
pub use error::GenAiError;
pub use google::GoogleGenAi;

use async_trait::async_trait;

/// Voice selection for a TTS call.
///
/// `speakers` holds speaker-name/voice-name pairs for multi-speaker
/// prompts; when empty the single `voice` is used.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub voice: String,
    pub speakers: Vec<(String, String)>,
}

impl SpeechRequest {
    pub fn single(voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            speakers: Vec::new(),
        }
    }
}

/// Unified interface over the generative model backend.
///
/// Object-safe; handlers hold it as `Arc<dyn GenerativeModel>`. Binary
/// results are fully materialized (PNG, WAV, MP4 bytes) - callers decide
/// whether to return them inline or upload them to the media host.
#[async_trait]
pub trait GenerativeModel: Send + Sync + 'static {
    /// Text generation; returns the first candidate's text.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenAiError>;

    /// Image generation; returns PNG bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenAiError>;

    /// Speech synthesis; returns WAV bytes.
    async fn generate_speech(
        &self,
        prompt: &str,
        voices: &SpeechRequest,
    ) -> Result<Vec<u8>, GenAiError>;

    /// Music generation; returns WAV bytes.
    async fn generate_music(&self, prompt: &str) -> Result<Vec<u8>, GenAiError>;

    /// Video generation; polls the long-running operation to completion
    /// and returns the downloaded MP4 bytes.
    async fn generate_video(&self, prompt: &str) -> Result<Vec<u8>, GenAiError>;
}
