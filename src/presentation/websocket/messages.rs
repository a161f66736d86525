//! WebSocket Message Types
//!
//! Client events are JSON objects, optionally tagged by `type`. Server
//! events are untagged; clients tell them apart by their keys (`info`,
//! `error`, `type: "file"`, or a chat message shape).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::services::ChatBroadcast;
use crate::domain::LanguageCode;

pub const INVALID_INIT: &str = "Invalid initialization data";
pub const INVALID_MESSAGE: &str = "Invalid message data";
pub const MESSAGE_NOT_SAVED: &str = "Message could not be saved";

/// Reasons an inbound frame was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("Chat message without string content")]
    MissingContent,
}

// ============================================================================
// Inbound
// ============================================================================

/// First frame a client sends after connecting.
#[derive(Debug, Default, Deserialize)]
pub struct InitPayload {
    #[serde(default, alias = "preferredLanguage")]
    pub preferred_language: Option<String>,
}

/// Parse the init frame and return the client's language.
///
/// `{}` is valid and selects the default language.
pub fn parse_init(raw: &[u8]) -> Result<LanguageCode, ProtocolError> {
    let fields = parse_object(raw)?;
    let init: InitPayload = serde_json::from_value(Value::Object(fields))?;
    Ok(LanguageCode::or_default(init.preferred_language.as_deref()))
}

/// Events a joined client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    UpdateLanguage(LanguageCode),
    /// Upload notices are broadcast by the upload endpoint, not the socket
    File,
    Chat { content: String },
}

/// Classify a frame by its `type`. An absent or unknown type is chat.
pub fn parse_client_event(raw: &[u8]) -> Result<ClientEvent, ProtocolError> {
    let mut fields = parse_object(raw)?;

    match fields.get("type").and_then(Value::as_str) {
        Some("update_language") => {
            let language = fields
                .get("preferred_language")
                .or_else(|| fields.get("preferredLanguage"))
                .and_then(Value::as_str);
            Ok(ClientEvent::UpdateLanguage(LanguageCode::or_default(language)))
        }
        Some("file") => Ok(ClientEvent::File),
        _ => match fields.remove("content") {
            Some(Value::String(content)) => Ok(ClientEvent::Chat { content }),
            _ => Err(ProtocolError::MissingContent),
        },
    }
}

fn parse_object(raw: &[u8]) -> Result<Map<String, Value>, ProtocolError> {
    match serde_json::from_slice(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(ProtocolError::NotAnObject),
    }
}

// ============================================================================
// Outbound
// ============================================================================

/// Anything the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    Chat(ChatPayload),
    File(FileNotice),
    Info(InfoNotice),
    Error(ErrorNotice),
}

impl OutboundEvent {
    pub fn info(text: impl Into<String>) -> Self {
        OutboundEvent::Info(InfoNotice { info: text.into() })
    }

    pub fn error(text: impl Into<String>) -> Self {
        OutboundEvent::Error(ErrorNotice { error: text.into() })
    }

    pub fn joined(room: &str, username: &str, language: &LanguageCode) -> Self {
        Self::info(format!(
            "Joined room {} as {} with language {}",
            room, username, language
        ))
    }

    pub fn language_updated(language: &LanguageCode) -> Self {
        Self::info(format!("Language updated to {}", language))
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::Chat(_) => "chat",
            OutboundEvent::File(_) => "file",
            OutboundEvent::Info(_) => "info",
            OutboundEvent::Error(_) => "error",
        }
    }
}

/// A chat (or transcribed voice) message as one recipient sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPayload {
    /// Store ID; voice messages are not stored and carry none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub room: String,
    /// Content in the recipient's language, or the original on fallback
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub detected_language: LanguageCode,
    pub original_content: String,
    pub original_language: LanguageCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl ChatPayload {
    /// Payload carrying the original content, before any translation.
    pub fn from_broadcast(chat: &ChatBroadcast) -> Self {
        let message = &chat.message;
        Self {
            id: Some(message.id),
            username: message.username.clone(),
            room: message.room.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
            detected_language: chat.detected_language.clone(),
            original_content: message.content.clone(),
            original_language: chat.detected_language.clone(),
            audio_base64: None,
        }
    }

    pub fn with_content(&self, content: String) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    File,
}

/// Announces an upload to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNotice {
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub username: String,
    pub room: String,
    pub file_name: String,
    pub file_id: String,
    pub file_url: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoNotice {
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(br#"{"preferred_language": "fr"}"#, "fr" ; "snake case key")]
    #[test_case(br#"{"preferredLanguage": "DE"}"#, "de" ; "camel case alias")]
    #[test_case(br#"{}"#, "en" ; "empty object defaults")]
    #[test_case(br#"{"preferred_language": ""}"#, "en" ; "empty code defaults")]
    fn test_parse_init(raw: &[u8], expected: &str) {
        assert_eq!(parse_init(raw).unwrap().as_str(), expected);
    }

    #[test_case(b"hello" ; "not json")]
    #[test_case(b"[1, 2]" ; "array")]
    #[test_case(b"\"fr\"" ; "bare string")]
    #[test_case(br#"{"preferred_language": 7}"# ; "non string language")]
    fn test_parse_init_rejects(raw: &[u8]) {
        assert!(parse_init(raw).is_err());
    }

    #[test]
    fn test_parse_client_events() {
        assert_eq!(
            parse_client_event(br#"{"type": "update_language", "preferred_language": "ES"}"#).unwrap(),
            ClientEvent::UpdateLanguage(LanguageCode::new("es"))
        );
        assert_eq!(
            parse_client_event(br#"{"type": "file", "file_id": "x"}"#).unwrap(),
            ClientEvent::File
        );
        assert_eq!(
            parse_client_event(br#"{"content": "hi"}"#).unwrap(),
            ClientEvent::Chat { content: "hi".into() }
        );
        assert_eq!(
            parse_client_event(br#"{"type": "shout", "content": "HI"}"#).unwrap(),
            ClientEvent::Chat { content: "HI".into() }
        );
    }

    #[test]
    fn test_chat_requires_string_content() {
        assert!(matches!(
            parse_client_event(br#"{"content": 42}"#),
            Err(ProtocolError::MissingContent)
        ));
        assert!(matches!(
            parse_client_event(br#"{"text": "hi"}"#),
            Err(ProtocolError::MissingContent)
        ));
        assert!(matches!(parse_client_event(b"{oops"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_notice_shapes() {
        let joined = serde_json::to_value(OutboundEvent::joined("lobby", "alice", &LanguageCode::new("fr"))).unwrap();
        assert_eq!(joined, json!({"info": "Joined room lobby as alice with language fr"}));

        let error = serde_json::to_value(OutboundEvent::error(INVALID_INIT)).unwrap();
        assert_eq!(error, json!({"error": "Invalid initialization data"}));
    }

    #[test]
    fn test_chat_payload_shape() {
        let chat = ChatBroadcast {
            message: Message {
                id: 3,
                username: "alice".into(),
                room: "lobby".into(),
                content: "hello".into(),
                timestamp: "2025-01-01T10:00:00Z".parse().unwrap(),
            },
            detected_language: LanguageCode::default(),
        };
        let payload = ChatPayload::from_broadcast(&chat).with_content("bonjour".into());
        let value = serde_json::to_value(OutboundEvent::Chat(payload)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 3,
                "username": "alice",
                "room": "lobby",
                "content": "bonjour",
                "timestamp": "2025-01-01T10:00:00Z",
                "detected_language": "en",
                "original_content": "hello",
                "original_language": "en"
            })
        );
    }

    #[test]
    fn test_file_notice_shape() {
        let notice = OutboundEvent::File(FileNotice {
            kind: FileKind::File,
            username: "bob".into(),
            room: "lobby".into(),
            file_name: "cat.png".into(),
            file_id: "abc.png".into(),
            file_url: "/static/uploads/abc.png".into(),
            timestamp: "2025-01-01T10:00:00Z".parse().unwrap(),
        });
        let value = serde_json::to_value(notice).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["file_url"], "/static/uploads/abc.png");
    }
}
