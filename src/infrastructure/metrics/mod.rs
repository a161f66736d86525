//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active WebSocket connections
//! - Chat, file and voice broadcasts by kind
//! - Per-recipient delivery failures by reason
//! - Translation gateway fallbacks by operation

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("babel_chat"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Broadcasts started, by kind ("chat", "file", "voice")
pub static BROADCASTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("broadcasts_total", "Total number of room broadcasts").namespace("babel_chat"),
        &["kind"],
    )
    .expect("Failed to create BROADCASTS_TOTAL metric")
});

/// Failed per-recipient deliveries, by reason
pub static DELIVERIES_FAILED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "deliveries_failed_total",
            "Total number of failed per-recipient deliveries",
        )
        .namespace("babel_chat"),
        &["reason"], // "closed", "backpressure", "serialization"
    )
    .expect("Failed to create DELIVERIES_FAILED_TOTAL metric")
});

/// Translation or detection calls that fell back to the original value
pub static TRANSLATION_FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "translation_fallbacks_total",
            "Total number of translation calls answered with a fallback value",
        )
        .namespace("babel_chat"),
        &["operation"], // "translate", "detect"
    )
    .expect("Failed to create TRANSLATION_FALLBACKS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(BROADCASTS_TOTAL.clone()))
        .expect("Failed to register BROADCASTS_TOTAL");
    registry
        .register(Box::new(DELIVERIES_FAILED_TOTAL.clone()))
        .expect("Failed to register DELIVERIES_FAILED_TOTAL");
    registry
        .register(Box::new(TRANSLATION_FALLBACKS_TOTAL.clone()))
        .expect("Failed to register TRANSLATION_FALLBACKS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to track connection open/close
pub fn websocket_connected() {
    Lazy::force(&REGISTRY);
    WEBSOCKET_CONNECTIONS_ACTIVE.inc();
}

pub fn websocket_disconnected() {
    WEBSOCKET_CONNECTIONS_ACTIVE.dec();
}

pub fn record_broadcast(kind: &str) {
    Lazy::force(&REGISTRY);
    BROADCASTS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_delivery_failure(reason: &str) {
    Lazy::force(&REGISTRY);
    DELIVERIES_FAILED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_translation_fallback(operation: &str) {
    Lazy::force(&REGISTRY);
    TRANSLATION_FALLBACKS_TOTAL.with_label_values(&[operation]).inc();
}
