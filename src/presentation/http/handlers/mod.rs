//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod files;
pub mod health;
pub mod languages;
pub mod room;
pub mod voice;
