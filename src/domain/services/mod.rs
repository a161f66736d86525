//! # Domain Services
//!
//! Contracts for the remote services the relay depends on. The domain only
//! defines what it needs; HTTP clients live in the infrastructure layer.
//!
//! ## Services
//!
//! - **TranslationService**: Text translation and language detection
//! - **SpeechService**: Speech-to-text and text-to-speech

mod speech;
mod translation;

pub use speech::*;
pub use translation::*;
