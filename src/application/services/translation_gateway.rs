//! Translation Gateway
//!
//! Wraps a [`TranslationService`] so that callers on the hot path never see
//! a failure. Every remote call is moved onto its own task, bounded by a
//! semaphore and a per-call timeout; any error yields a fallback value.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::config::TranslationSettings;
use crate::domain::{LanguageCode, SupportedLanguage, TranslationError, TranslationService};
use crate::infrastructure::metrics;

/// Fail-open front for the translation backend.
#[derive(Clone)]
pub struct TranslationGateway {
    service: Arc<dyn TranslationService>,
    permits: Arc<Semaphore>,
    call_timeout: Duration,
}

impl TranslationGateway {
    pub fn new(
        service: Arc<dyn TranslationService>,
        max_concurrent_calls: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            service,
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
            call_timeout,
        }
    }

    pub fn from_settings(service: Arc<dyn TranslationService>, settings: &TranslationSettings) -> Self {
        Self::new(service, settings.max_concurrent_calls, settings.timeout())
    }

    /// Translate `text` into `dest`, letting the backend detect the source.
    ///
    /// Returns `text` unchanged when the call fails or times out.
    pub async fn translate(&self, text: &str, dest: &LanguageCode) -> String {
        self.translate_from(text, None, dest).await
    }

    /// Translate with an explicit source language.
    pub async fn translate_from(
        &self,
        text: &str,
        source: Option<&LanguageCode>,
        dest: &LanguageCode,
    ) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let service = Arc::clone(&self.service);
        let owned = text.to_string();
        let source = source.cloned();
        let target = dest.clone();
        let call = async move { service.translate(&owned, source, &target).await };

        match self.offload(call).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(error = %e, dest = %dest, "Translation failed, delivering original text");
                metrics::record_translation_fallback("translate");
                text.to_string()
            }
        }
    }

    /// Detect the language of `text`, falling back to the default language.
    pub async fn detect_language(&self, text: &str) -> LanguageCode {
        if text.trim().is_empty() {
            return LanguageCode::default();
        }

        let service = Arc::clone(&self.service);
        let owned = text.to_string();
        let call = async move { service.detect(&owned).await };

        match self.offload(call).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(error = %e, "Language detection failed, assuming default");
                metrics::record_translation_fallback("detect");
                LanguageCode::default()
            }
        }
    }

    /// Languages the backend supports. Unlike the other calls this one
    /// reports failures, since there is no sensible fallback list.
    pub async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError> {
        let service = Arc::clone(&self.service);
        self.offload(async move { service.supported_languages().await })
            .await
    }

    /// Run a backend call on its own task.
    ///
    /// The permit is taken before spawning, so callers queue once the limit
    /// is reached. A caller that goes away detaches the task, which still
    /// runs to completion and releases its permit.
    async fn offload<T, F>(&self, call: F) -> Result<T, TranslationError>
    where
        F: Future<Output = Result<T, TranslationError>> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| TranslationError::Worker(e.to_string()))?;
        let call_timeout = self.call_timeout;

        let handle = tokio::spawn(async move {
            let _permit = permit;
            tokio::time::timeout(call_timeout, call)
                .await
                .unwrap_or(Err(TranslationError::Timeout))
        });

        handle
            .await
            .map_err(|e| TranslationError::Worker(e.to_string()))?
    }
}
