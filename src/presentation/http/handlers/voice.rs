//! Voice Handlers
//!
//! - `POST /voice_message` - Transcribe a clip and relay it to a room
//! - `POST /voice-translate` - One-shot speech translation, no room involved

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::application::services::VoiceError;
use crate::domain::{AudioClip, LanguageCode};
use crate::presentation::http::extractors::{FormData, FormFile};
use crate::presentation::websocket::JoinPath;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const DEFAULT_AUDIO_MIME: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
pub struct VoiceStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VoiceTranslation {
    pub translated_text: String,
    pub audio_base64: String,
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Voice request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub async fn voice_message(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<VoiceStatus>, Response> {
    let (target, language, audio) = voice_message_fields(&mut form).map_err(IntoResponse::into_response)?;

    let transcript = state
        .voice
        .transcribe(&clip(audio), language)
        .await
        .map_err(IntoResponse::into_response)?;

    state
        .voice_relay
        .relay(&target.username, &target.room, &transcript)
        .await;

    Ok(Json(VoiceStatus { status: "ok" }))
}

pub async fn voice_translate(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<VoiceTranslation>, Response> {
    let audio = form
        .take_file("audio_file")
        .map_err(IntoResponse::into_response)?;
    let source = LanguageCode::new(form.text_or("source_lang", "hi"));
    let target = LanguageCode::new(form.text_or("target_lang", "en"));

    let result = state
        .voice
        .translate_clip(&clip(audio), source, target)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(VoiceTranslation {
        translated_text: result.translated_text,
        audio_base64: result.audio_base64,
    }))
}

fn voice_message_fields(form: &mut FormData) -> Result<(JoinPath, LanguageCode, FormFile), AppError> {
    let target = JoinPath {
        room: form.require_text("room")?,
        username: form.require_text("username")?,
    };
    target.validate().map_err(validation_error)?;
    let language = LanguageCode::or_default(form.text("preferred_language"));
    let audio = form.take_file("audio")?;
    Ok((target, language, audio))
}

fn clip(file: FormFile) -> AudioClip {
    AudioClip {
        mime_type: file
            .content_type
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string()),
        file_name: file.file_name,
        bytes: file.data,
    }
}
