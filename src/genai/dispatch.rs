//! Generation dispatcher - modality selection for incoming prompts.
//!
//! Callers may tag a request with an explicit [`GenerationKind`]; untagged
//! prompts fall back to substring classification with a fixed precedence
//! (image, audio/TTS, music, video, else text). First match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five generative modalities the console proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Text,
    Image,
    Audio,
    Music,
    Video,
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationKind::Text => "text",
            GenerationKind::Image => "image",
            GenerationKind::Audio => "audio",
            GenerationKind::Music => "music",
            GenerationKind::Video => "video",
        };
        write!(f, "{}", s)
    }
}

/// Marker that switches TTS requests into multi-speaker mode.
pub const MULTI_SPEAKER_MARKER: &str = "multi-speaker";

/// Classify a free-text prompt by substring containment.
///
/// Precedence is fixed: image beats audio beats music beats video; anything
/// without a marker is text. Matching is case-insensitive.
pub fn classify(prompt: &str) -> GenerationKind {
    let lowered = prompt.to_lowercase();
    if lowered.contains("image") {
        GenerationKind::Image
    } else if lowered.contains("audio") || lowered.contains("tts") {
        GenerationKind::Audio
    } else if lowered.contains("music") {
        GenerationKind::Music
    } else if lowered.contains("video") {
        GenerationKind::Video
    } else {
        GenerationKind::Text
    }
}

/// Resolve the effective modality: an explicit tag wins over sniffing.
pub fn resolve(kind: Option<GenerationKind>, prompt: &str) -> GenerationKind {
    kind.unwrap_or_else(|| classify(prompt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prompt_is_text() {
        assert_eq!(classify("write me a haiku about rust"), GenerationKind::Text);
    }

    #[test]
    fn test_image_beats_audio() {
        // Precedence: first match wins even when both markers are present.
        assert_eq!(
            classify("an image of a band playing audio"),
            GenerationKind::Image
        );
    }

    #[test]
    fn test_tts_routes_to_audio() {
        assert_eq!(classify("read this aloud with TTS"), GenerationKind::Audio);
    }

    #[test]
    fn test_music_and_video_markers() {
        assert_eq!(classify("lofi music for studying"), GenerationKind::Music);
        assert_eq!(classify("a video of a kitten"), GenerationKind::Video);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify("An IMAGE of a cat"), GenerationKind::Image);
    }

    #[test]
    fn test_explicit_kind_overrides_sniffing() {
        assert_eq!(
            resolve(Some(GenerationKind::Audio), "an image of a cat"),
            GenerationKind::Audio
        );
        assert_eq!(resolve(None, "an image of a cat"), GenerationKind::Image);
    }

    #[test]
    fn test_kind_serde_roundtrip() {
        let kind: GenerationKind = serde_json::from_str("\"music\"").unwrap();
        assert_eq!(kind, GenerationKind::Music);
        assert_eq!(serde_json::to_string(&GenerationKind::Video).unwrap(), "\"video\"");
    }
}
