//! Broadcast Engine
//!
//! Fans events out to every session of a room. Chat content is translated
//! once per distinct recipient language; everything else is delivered as is.
//! A failed delivery only affects its own recipient.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;

use super::messages::{ChatPayload, OutboundEvent};
use super::registry::RoomRegistry;
use super::session::{DeliveryError, Session};
use crate::application::services::{ChatBroadcast, TranslationGateway};
use crate::domain::LanguageCode;
use crate::infrastructure::metrics;

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct BroadcastEngine {
    registry: Arc<RoomRegistry>,
    translator: TranslationGateway,
}

impl BroadcastEngine {
    pub fn new(registry: Arc<RoomRegistry>, translator: TranslationGateway) -> Self {
        Self {
            registry,
            translator,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Deliver a stored chat message to its room, translated per recipient.
    ///
    /// Recipients whose language matches the detected language get the
    /// content verbatim. On translation failure the original is delivered.
    pub async fn broadcast_chat(&self, chat: &ChatBroadcast) -> BroadcastReport {
        metrics::record_broadcast("chat");

        // Language is read once per session so the translation set and
        // the delivery below agree even if a client switches mid-broadcast.
        let recipients: Vec<(Arc<Session>, LanguageCode)> = self
            .registry
            .sessions_in(&chat.message.room)
            .into_iter()
            .map(|session| {
                let language = session.preferred_language();
                (session, language)
            })
            .collect();

        let targets: HashSet<&LanguageCode> = recipients
            .iter()
            .map(|(_, language)| language)
            .filter(|language| **language != chat.detected_language)
            .collect();

        let content = chat.message.content.as_str();
        let translations: HashMap<&LanguageCode, String> = join_all(targets.into_iter().map(
            |language| async move { (language, self.translator.translate(content, language).await) },
        ))
        .await
        .into_iter()
        .collect();

        let base = ChatPayload::from_broadcast(chat);
        let deliveries = recipients
            .iter()
            .map(|(session, language)| {
                let payload = match translations.get(language) {
                    Some(translated) => base.with_content(translated.clone()),
                    None => base.clone(),
                };
                (session.clone(), OutboundEvent::Chat(payload))
            })
            .collect();

        let report = self.deliver_tailored(deliveries).await;
        tracing::debug!(
            room = %chat.message.room,
            message_id = chat.message.id,
            languages = translations.len(),
            delivered = report.delivered,
            failed = report.failed,
            "Chat broadcast finished"
        );
        report
    }

    /// Deliver the same event to everyone in a room.
    pub async fn broadcast_notice(&self, room: &str, event: OutboundEvent) -> BroadcastReport {
        metrics::record_broadcast(event.kind());

        let deliveries = self
            .registry
            .sessions_in(room)
            .into_iter()
            .map(|session| (session, event.clone()))
            .collect();

        let report = self.deliver_tailored(deliveries).await;
        tracing::debug!(
            room = %room,
            kind = event.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "Notice broadcast finished"
        );
        report
    }

    /// Deliver payloads that were already built per recipient.
    pub async fn deliver_tailored(
        &self,
        deliveries: Vec<(Arc<Session>, OutboundEvent)>,
    ) -> BroadcastReport {
        let recipients = deliveries.len();

        let outcomes = join_all(
            deliveries
                .into_iter()
                .map(|(session, event)| async move { deliver_one(&session, &event).await }),
        )
        .await;

        let delivered = outcomes.into_iter().filter(|ok| *ok).count();
        BroadcastReport {
            recipients,
            delivered,
            failed: recipients - delivered,
        }
    }
}

async fn deliver_one(session: &Session, event: &OutboundEvent) -> bool {
    match session.deliver(event).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                room = %session.room(),
                session_id = %session.id(),
                username = %session.username(),
                error = %e,
                "Delivery failed"
            );
            metrics::record_delivery_failure(e.reason());
            // A client that cannot keep up, or whose writer is gone, is disconnected
            if matches!(e, DeliveryError::Backpressure | DeliveryError::Closed) {
                session.terminate();
            }
            false
        }
    }
}
