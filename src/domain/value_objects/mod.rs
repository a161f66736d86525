//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **LanguageCode**: Normalized, never-empty language code

mod language;

pub use language::*;
