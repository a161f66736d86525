//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Message store repositories (PostgreSQL, in-memory)
//! - Translation and speech HTTP clients
//! - Disk storage for uploads
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
pub mod speech;
pub mod storage;
pub mod translation;
