//! Voice Relay
//!
//! Sends a transcribed voice message to a room. Each distinct recipient
//! language gets its own translation and synthesized audio; the engine then
//! delivers the tailored payloads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;

use super::broadcast::{BroadcastEngine, BroadcastReport};
use super::messages::{ChatPayload, OutboundEvent};
use crate::application::services::{VoiceService, VoiceTranscript};
use crate::domain::LanguageCode;
use crate::infrastructure::metrics;

pub struct VoiceRelay {
    engine: Arc<BroadcastEngine>,
    voice: Arc<VoiceService>,
}

impl VoiceRelay {
    pub fn new(engine: Arc<BroadcastEngine>, voice: Arc<VoiceService>) -> Self {
        Self { engine, voice }
    }

    pub async fn relay(
        &self,
        username: &str,
        room: &str,
        transcript: &VoiceTranscript,
    ) -> BroadcastReport {
        metrics::record_broadcast("voice");

        let recipients: Vec<_> = self
            .engine
            .registry()
            .sessions_in(room)
            .into_iter()
            .map(|session| {
                let language = session.preferred_language();
                (session, language)
            })
            .collect();

        let languages: HashSet<&LanguageCode> = recipients.iter().map(|(_, language)| language).collect();
        let rendered: HashMap<&LanguageCode, _> = join_all(languages.into_iter().map(|language| async move {
            (language, self.voice.render_for(transcript, language).await)
        }))
        .await
        .into_iter()
        .collect();

        let base = ChatPayload {
            id: None,
            username: username.to_string(),
            room: room.to_string(),
            content: transcript.text.clone(),
            timestamp: Utc::now(),
            detected_language: transcript.detected_language.clone(),
            original_content: transcript.text.clone(),
            original_language: transcript.detected_language.clone(),
            audio_base64: None,
        };

        let deliveries = recipients
            .iter()
            .map(|(session, language)| {
                let mut payload = base.clone();
                if let Some(voice) = rendered.get(language) {
                    payload.content = voice.text.clone();
                    payload.audio_base64 = voice.audio_base64.clone();
                }
                (session.clone(), OutboundEvent::Chat(payload))
            })
            .collect();

        let report = self.engine.deliver_tailored(deliveries).await;
        tracing::info!(
            room = %room,
            username = %username,
            languages = rendered.len(),
            delivered = report.delivered,
            failed = report.failed,
            "Voice message relayed"
        );
        report
    }
}
