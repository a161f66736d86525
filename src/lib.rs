//! # Babel Chat Library
//!
//! A multi-room chat relay that translates each message into every
//! reader's language:
//! - WebSocket rooms with per-recipient translation
//! - Voice messages (speech-to-text, translation, text-to-speech)
//! - File uploads announced to the room
//! - Room history in PostgreSQL, or in memory when no database is set
//!
//! ## Architecture
//!
//! - **Domain Layer**: Message entity, language codes, backend contracts
//! - **Application Layer**: Translation gateway and chat/room/file/voice services
//! - **Infrastructure Layer**: Stores, HTTP clients, disk storage, metrics
//! - **Presentation Layer**: HTTP handlers and the WebSocket relay
//!
//! ## Module Structure
//!
//! ```text
//! babel_chat/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects and service traits
//! +-- application/    Application services
//! +-- infrastructure/ Database, HTTP clients, storage, metrics
//! +-- presentation/   HTTP routes and WebSocket relay
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Core types and contracts
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
