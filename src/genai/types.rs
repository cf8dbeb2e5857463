//! Wire types for the Google Generative Language API.
//!
//! Only the fields the console actually reads or writes are modeled;
//! everything else in the upstream payloads is ignored on deserialize.

use serde::{Deserialize, Serialize};

/// `models/{model}:generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A plain single-turn text prompt.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
        }
    }

    pub fn with_modalities(mut self, modalities: &[&str]) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.response_modalities = Some(modalities.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_speech_config(mut self, speech: SpeechConfig) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.speech_config = Some(speech);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_speaker_voice_config: Option<MultiSpeakerVoiceConfig>,
}

impl SpeechConfig {
    /// Single prebuilt voice.
    pub fn single(voice_name: &str) -> Self {
        Self {
            voice_config: Some(VoiceConfig::prebuilt(voice_name)),
            multi_speaker_voice_config: None,
        }
    }

    /// Two speaker/voice pairs for multi-speaker TTS.
    pub fn multi_speaker(pairs: &[(String, String)]) -> Self {
        Self {
            voice_config: None,
            multi_speaker_voice_config: Some(MultiSpeakerVoiceConfig {
                speaker_voice_configs: pairs
                    .iter()
                    .map(|(speaker, voice)| SpeakerVoiceConfig {
                        speaker: speaker.clone(),
                        voice_config: VoiceConfig::prebuilt(voice),
                    })
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

impl VoiceConfig {
    fn prebuilt(voice_name: &str) -> Self {
        Self {
            prebuilt_voice_config: PrebuiltVoiceConfig {
                voice_name: voice_name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSpeakerVoiceConfig {
    pub speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerVoiceConfig {
    pub speaker: String,
    pub voice_config: VoiceConfig,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateContentResponse {
    /// First text part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }

    /// First inline-data part of the first candidate.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }
}

/// `models/{model}:predictLongRunning` request for video generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: String,
    pub person_generation: String,
}

/// Long-running operation handle, polled until `done`.
#[derive(Debug, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub response: Option<VideoOperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperationResponse {
    #[serde(default)]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedVideo {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    pub uri: String,
}
