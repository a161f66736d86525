//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **TranslationGateway**: Bounded, fail-open access to the translation backend
//! - **ChatService**: Language detection and persistence of chat messages
//! - **RoomService**: Room history and reset
//! - **FileService**: Upload storage and downloads
//! - **VoiceService**: Speech-to-text, translation and text-to-speech

pub mod chat_service;
pub mod file_service;
pub mod room_service;
pub mod translation_gateway;
pub mod voice_service;

pub use chat_service::{ChatBroadcast, ChatService};
pub use file_service::{Download, FileService, FileUpload, StoredUpload, UPLOAD_URL_PREFIX};
pub use room_service::RoomService;
pub use translation_gateway::TranslationGateway;
pub use voice_service::{RenderedVoice, TranslatedClip, VoiceError, VoiceService, VoiceTranscript};
