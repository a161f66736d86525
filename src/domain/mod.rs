//! # Domain Layer
//!
//! The domain layer contains the core types of the relay.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Persisted entities (Message) and their repository traits
//! - **value_objects**: Immutable value types (LanguageCode)
//! - **services**: Contracts for remote translation and speech services
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository and service traits define external contracts
//! - Implementations are injected, so tests can swap in fakes

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
