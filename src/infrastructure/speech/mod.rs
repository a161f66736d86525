//! Speech Client
//!
//! HTTP client for the speech sidecar that wraps speech-to-text and
//! text-to-speech models.
//!
//! ```text
//! POST {base}/transcribe  multipart: audio, language  -> {text}
//! POST {base}/synthesize  {text, language}            -> audio/mpeg bytes
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SpeechSettings;
use crate::domain::{AudioClip, LanguageCode, SpeechError, SpeechService};

/// Speech sidecar client.
#[derive(Clone)]
pub struct HttpSpeechClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    language: &'a str,
}

impl HttpSpeechClient {
    pub fn new(settings: &SpeechSettings) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        Ok(Self::with_client(client, &settings.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SpeechError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SpeechService for HttpSpeechClient {
    async fn transcribe(
        &self,
        clip: &AudioClip,
        language: &LanguageCode,
    ) -> Result<String, SpeechError> {
        let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(&clip.mime_type)
            .map_err(|e| SpeechError::Request(format!("Failed to create multipart: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("audio", part)
            .text("language", language.to_string());

        let response = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let body: TranscribeResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SpeechError::Decode(e.to_string()))?;

        Ok(body.text.trim().to_string())
    }

    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .post(format!("{}/synthesize", self.base_url))
            .json(&SynthesizeRequest {
                text,
                language: language.as_str(),
            })
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| SpeechError::Decode(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
