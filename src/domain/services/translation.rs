//! Translation service contract.
//!
//! The relay never translates by itself; it calls out to a remote service
//! through this trait. Every call may fail and callers must treat it as a
//! fallible network operation.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::value_objects::LanguageCode;

/// Errors raised by a translation backend.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(String),

    #[error("Translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected translation response: {0}")]
    Decode(String),

    #[error("Translation call timed out")]
    Timeout,

    #[error("Translation worker failed: {0}")]
    Worker(String),
}

/// A language the translation backend can handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub name: String,
}

/// Remote text translation and language detection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate `text` into `dest`. A `source` of `None` asks the backend to auto-detect.
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageCode>,
        dest: &LanguageCode,
    ) -> Result<String, TranslationError>;

    /// Detect the language `text` is written in.
    async fn detect(&self, text: &str) -> Result<LanguageCode, TranslationError>;

    /// List the languages the backend supports.
    async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError>;
}
