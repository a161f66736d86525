//! Translation Client
//!
//! HTTP client for a LibreTranslate-compatible translation API.
//!
//! ```text
//! POST {base}/translate  {q, source, target, format, api_key?} -> {translatedText}
//! POST {base}/detect     {q, api_key?}                         -> [{language, confidence}]
//! GET  {base}/languages                                        -> [{code, name}]
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranslationSettings;
use crate::domain::{LanguageCode, SupportedLanguage, TranslationError, TranslationService};

/// Translation API client.
#[derive(Clone)]
pub struct HttpTranslationClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    name: String,
}

impl HttpTranslationClient {
    pub fn new(settings: &TranslationSettings) -> Result<Self, TranslationError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        Ok(Self::with_client(
            client,
            &settings.base_url,
            settings.api_key.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TranslationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| TranslationError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TranslationService for HttpTranslationClient {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageCode>,
        dest: &LanguageCode,
    ) -> Result<String, TranslationError> {
        let source = source.as_ref().map(LanguageCode::as_str).unwrap_or("auto");
        let request = TranslateRequest {
            q: text,
            source,
            target: dest.as_str(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let body: TranslateResponse = Self::decode(response).await?;
        Ok(body.translated_text)
    }

    async fn detect(&self, text: &str) -> Result<LanguageCode, TranslationError> {
        let request = DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let detections: Vec<Detection> = Self::decode(response).await?;
        detections
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|d| LanguageCode::new(d.language))
            .ok_or_else(|| TranslationError::Decode("empty detection result".into()))
    }

    async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError> {
        let response = self
            .client
            .get(format!("{}/languages", self.base_url))
            .send()
            .await
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let entries: Vec<LanguageEntry> = Self::decode(response).await?;
        Ok(entries
            .into_iter()
            .map(|e| SupportedLanguage {
                code: e.code,
                name: e.name,
            })
            .collect())
    }
}
