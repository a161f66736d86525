//! Application Layer
//!
//! Contains the services that sit between the transport layer and the
//! domain: translation gating, message ingest, rooms, files and voice.

pub mod services;
