//! Speech service contract (speech-to-text and text-to-speech).

use async_trait::async_trait;

use crate::domain::value_objects::LanguageCode;

/// Errors raised by a speech backend.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech request failed: {0}")]
    Request(String),

    #[error("Speech service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected speech response: {0}")]
    Decode(String),
}

/// An uploaded audio clip.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// Remote speech recognition and synthesis.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Transcribe spoken audio in `language` into text.
    async fn transcribe(&self, clip: &AudioClip, language: &LanguageCode)
        -> Result<String, SpeechError>;

    /// Render `text` as spoken audio (MP3 bytes) in `language`.
    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<Vec<u8>, SpeechError>;
}
