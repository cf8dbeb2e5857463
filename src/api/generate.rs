//! Credit-gated generation route handlers.
//!
//! The dedicated routes (`/text`, `/image`, ...) force their modality;
//! `/genai` takes an explicit `kind` tag or falls back to prompt
//! sniffing. Every path runs the same sequence: credit gate, model call,
//! optional media upload, then settlement (history row + decrement).

use super::types::{ApiError, GenerateParams, MediaGenerationResponse};
use super::AppState;
use crate::cache::image_cache_key;
use crate::error::ConsoleError;
use crate::genai::{dispatch, GenerationKind, SpeechRequest, MULTI_SPEAKER_MARKER};
use crate::media::MediaResource;
use crate::store::ApiKeyRecord;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// POST /text
pub async fn text(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, Some(GenerationKind::Text)).await
}

/// POST /image
pub async fn image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, Some(GenerationKind::Image)).await
}

/// POST /audio
pub async fn audio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, Some(GenerationKind::Audio)).await
}

/// POST /music
pub async fn music(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, Some(GenerationKind::Music)).await
}

/// POST /video
pub async fn video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, Some(GenerationKind::Video)).await
}

/// POST /genai - modality chosen by tag or prompt sniffing.
pub async fn genai(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, ApiError> {
    run(state, params, None).await
}

async fn run(
    state: Arc<AppState>,
    params: GenerateParams,
    forced: Option<GenerationKind>,
) -> Result<Response, ApiError> {
    let prompt = params
        .prompt
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ConsoleError::BadRequest("Missing prompt".into()))?;
    let api_key = params
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ConsoleError::BadRequest("Missing API key".into()))?;

    let record = state.gate.authorize(api_key).await?;
    let kind = forced.unwrap_or_else(|| dispatch::resolve(params.kind, prompt));
    info!(kind = %kind, key = %record.key, "generation request");

    let response = match kind {
        GenerationKind::Text => handle_text(&state, &record, prompt).await?,
        GenerationKind::Image => handle_image(&state, &record, prompt).await?,
        GenerationKind::Audio => handle_audio(&state, &record, prompt, &params).await?,
        GenerationKind::Music => handle_music(&state, &record, prompt).await?,
        GenerationKind::Video => handle_video(&state, &record, prompt).await?,
    };
    Ok(response)
}

async fn handle_text(
    state: &AppState,
    record: &ApiKeyRecord,
    prompt: &str,
) -> Result<Response, ConsoleError> {
    let output = state.genai.generate_text(prompt).await?;
    state
        .gate
        .settle(record, GenerationKind::Text, prompt, &output)
        .await?;
    Ok(output.into_response())
}

async fn handle_image(
    state: &AppState,
    record: &ApiKeyRecord,
    prompt: &str,
) -> Result<Response, ConsoleError> {
    // Identical prompts within the cache window are served from the
    // cached asset without another upstream call or charge.
    let cache_key = image_cache_key(prompt);
    if let Some(encoded) = state.cache.get::<String>(&cache_key) {
        if let Ok(bytes) = BASE64.decode(&encoded) {
            return Ok(png_response(bytes));
        }
        state.cache.remove(&cache_key);
    }

    let bytes = state.genai.generate_image(prompt).await?;
    state.cache.put(
        &cache_key,
        &BASE64.encode(&bytes),
        Duration::from_secs(state.config.cache.image_ttl_seconds),
    );

    let file_name = format!("{}.png", Uuid::new_v4());
    let url = state
        .media
        .upload(MediaResource::Image, &file_name, bytes.clone())
        .await?;
    state
        .gate
        .settle(record, GenerationKind::Image, prompt, &url)
        .await?;
    Ok(png_response(bytes))
}

async fn handle_audio(
    state: &AppState,
    record: &ApiKeyRecord,
    prompt: &str,
    params: &GenerateParams,
) -> Result<Response, ConsoleError> {
    let voices = speech_request(state, prompt, params);
    let bytes = state.genai.generate_speech(prompt, &voices).await?;

    let file_name = format!("{}.wav", Uuid::new_v4());
    // The media host files audio under its video resource class.
    let url = state
        .media
        .upload(MediaResource::Video, &file_name, bytes)
        .await?;
    state
        .gate
        .settle(record, GenerationKind::Audio, prompt, &url)
        .await?;
    Ok(Json(MediaGenerationResponse {
        message: "Audio file generated successfully".into(),
        file_url: url,
    })
    .into_response())
}

async fn handle_music(
    state: &AppState,
    record: &ApiKeyRecord,
    prompt: &str,
) -> Result<Response, ConsoleError> {
    let bytes = state.genai.generate_music(prompt).await?;

    let file_name = format!("{}.wav", Uuid::new_v4());
    let url = state
        .media
        .upload(MediaResource::Video, &file_name, bytes)
        .await?;
    state
        .gate
        .settle(record, GenerationKind::Music, prompt, &url)
        .await?;
    Ok(Json(MediaGenerationResponse {
        message: "Music file generated successfully".into(),
        file_url: url,
    })
    .into_response())
}

async fn handle_video(
    state: &AppState,
    record: &ApiKeyRecord,
    prompt: &str,
) -> Result<Response, ConsoleError> {
    let bytes = state.genai.generate_video(prompt).await?;

    let file_name = format!("{}.mp4", Uuid::new_v4());
    let url = state
        .media
        .upload(MediaResource::Video, &file_name, bytes)
        .await?;
    state
        .gate
        .settle(record, GenerationKind::Video, prompt, &url)
        .await?;
    Ok(Json(MediaGenerationResponse {
        message: "Video file generated successfully".into(),
        file_url: url,
    })
    .into_response())
}

/// Voice selection: the multi-speaker marker plus two complete
/// speaker/voice pairs switches into multi-speaker mode, otherwise the
/// configured default voice is used.
fn speech_request(state: &AppState, prompt: &str, params: &GenerateParams) -> SpeechRequest {
    let mut request = SpeechRequest::single(&state.config.genai.default_voice);
    if prompt.to_lowercase().contains(MULTI_SPEAKER_MARKER) {
        let pairs = [
            (params.speaker1.as_ref(), params.voice1.as_ref()),
            (params.speaker2.as_ref(), params.voice2.as_ref()),
        ];
        for (speaker, voice) in pairs.into_iter() {
            if let (Some(speaker), Some(voice)) = (speaker, voice) {
                request.speakers.push((speaker.clone(), voice.clone()));
            }
        }
    }
    request
}

fn png_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_DISPOSITION, "inline; filename=image.png"),
        ],
        bytes,
    )
        .into_response()
}
