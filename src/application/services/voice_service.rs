//! Voice Service
//!
//! Speech-to-text, translation and text-to-speech for voice messages.
//! Speech calls are expensive, so they share a small semaphore.

use std::future::Future;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::Semaphore;

use crate::config::SpeechSettings;
use crate::domain::{AudioClip, LanguageCode, SpeechError, SpeechService};

use super::TranslationGateway;

/// Errors surfaced to voice endpoints.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Speech-to-text failed: {0}")]
    Transcription(SpeechError),

    #[error("Text-to-speech failed: {0}")]
    Synthesis(SpeechError),
}

/// What a speaker said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTranscript {
    pub text: String,
    /// Language the speaker declared for their audio
    pub spoken_language: LanguageCode,
    /// Language detected from the transcript
    pub detected_language: LanguageCode,
}

/// A transcript rendered for one target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVoice {
    pub text: String,
    /// MP3 audio, base64 encoded. `None` when synthesis failed.
    pub audio_base64: Option<String>,
}

/// Result of a one-shot voice translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedClip {
    pub translated_text: String,
    pub audio_base64: String,
}

pub struct VoiceService {
    speech: Arc<dyn SpeechService>,
    translator: TranslationGateway,
    permits: Arc<Semaphore>,
}

impl VoiceService {
    pub fn new(
        speech: Arc<dyn SpeechService>,
        translator: TranslationGateway,
        max_concurrent_calls: usize,
    ) -> Self {
        Self {
            speech,
            translator,
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    pub fn from_settings(
        speech: Arc<dyn SpeechService>,
        translator: TranslationGateway,
        settings: &SpeechSettings,
    ) -> Self {
        Self::new(speech, translator, settings.max_concurrent_calls)
    }

    /// Transcribe a clip and detect the language of the transcript.
    ///
    /// A blank transcript keeps the speaker's declared language.
    pub async fn transcribe(
        &self,
        clip: &AudioClip,
        spoken_language: LanguageCode,
    ) -> Result<VoiceTranscript, VoiceError> {
        let text = self
            .gated(self.speech.transcribe(clip, &spoken_language))
            .await
            .map_err(VoiceError::Transcription)?;

        let detected_language = if text.trim().is_empty() {
            spoken_language.clone()
        } else {
            self.translator.detect_language(&text).await
        };

        tracing::debug!(
            spoken = %spoken_language,
            detected = %detected_language,
            chars = text.len(),
            "Voice clip transcribed"
        );

        Ok(VoiceTranscript {
            text,
            spoken_language,
            detected_language,
        })
    }

    /// Translate a transcript for `target` and synthesize it.
    ///
    /// Never fails: translation falls back to the transcript and a failed
    /// synthesis leaves `audio_base64` empty.
    pub async fn render_for(&self, transcript: &VoiceTranscript, target: &LanguageCode) -> RenderedVoice {
        let text = if *target == transcript.detected_language {
            transcript.text.clone()
        } else {
            self.translator
                .translate_from(&transcript.text, Some(&transcript.detected_language), target)
                .await
        };

        let audio_base64 = match self.synthesize(&text, target).await {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                tracing::warn!(error = %e, target = %target, "Text-to-speech failed, sending text only");
                None
            }
        };

        RenderedVoice { text, audio_base64 }
    }

    /// Speech in `source` to speech in `target`, without any room involved.
    pub async fn translate_clip(
        &self,
        clip: &AudioClip,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<TranslatedClip, VoiceError> {
        let transcript = self
            .gated(self.speech.transcribe(clip, &source))
            .await
            .map_err(VoiceError::Transcription)?;

        let translated_text = if source == target {
            transcript
        } else {
            self.translator
                .translate_from(&transcript, Some(&source), &target)
                .await
        };

        let audio_base64 = self.synthesize(&translated_text, &target).await?;

        Ok(TranslatedClip {
            translated_text,
            audio_base64,
        })
    }

    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<String, VoiceError> {
        let audio = self
            .gated(self.speech.synthesize(text, language))
            .await
            .map_err(VoiceError::Synthesis)?;
        Ok(STANDARD.encode(audio))
    }

    async fn gated<T>(
        &self,
        call: impl Future<Output = Result<T, SpeechError>>,
    ) -> Result<T, SpeechError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;
        call.await
    }
}
