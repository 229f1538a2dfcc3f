//! Prometheus Metrics Module
//!
//! # Metrics Collected
//! - Live WebSocket connections and online users
//! - Outbound events by name (counted per delivered connection)
//! - Relayed chat messages
//! - Durable write outcomes
//! - Rejected inbound payloads by error code

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of registered WebSocket connections",
        )
        .namespace("chat_realtime"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

pub static ONLINE_USERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("online_users", "Number of users in the presence set").namespace("chat_realtime"),
    )
    .expect("Failed to create ONLINE_USERS metric")
});

pub static EVENTS_EMITTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "events_emitted_total",
            "Outbound events delivered to connections",
        )
        .namespace("chat_realtime"),
        &["event"],
    )
    .expect("Failed to create EVENTS_EMITTED_TOTAL metric")
});

pub static MESSAGES_RELAYED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_relayed_total", "Chat messages fanned out").namespace("chat_realtime"),
    )
    .expect("Failed to create MESSAGES_RELAYED_TOTAL metric")
});

pub static PERSIST_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("persist_attempts_total", "Durable message write attempts")
            .namespace("chat_realtime"),
        &["outcome"], // "ok", "retry", "failed"
    )
    .expect("Failed to create PERSIST_ATTEMPTS_TOTAL metric")
});

pub static PAYLOAD_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("payload_errors_total", "Rejected inbound frames").namespace("chat_realtime"),
        &["code"],
    )
    .expect("Failed to create PAYLOAD_ERRORS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(ONLINE_USERS.clone()))
        .expect("Failed to register ONLINE_USERS");
    registry
        .register(Box::new(EVENTS_EMITTED_TOTAL.clone()))
        .expect("Failed to register EVENTS_EMITTED_TOTAL");
    registry
        .register(Box::new(MESSAGES_RELAYED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_RELAYED_TOTAL");
    registry
        .register(Box::new(PERSIST_ATTEMPTS_TOTAL.clone()))
        .expect("Failed to register PERSIST_ATTEMPTS_TOTAL");
    registry
        .register(Box::new(PAYLOAD_ERRORS_TOTAL.clone()))
        .expect("Failed to register PAYLOAD_ERRORS_TOTAL");
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

pub fn set_websocket_connections(count: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(count as i64);
}

pub fn set_online_users(count: usize) {
    ONLINE_USERS.set(count as i64);
}

pub fn record_event_emitted(event: &str, deliveries: usize) {
    if deliveries > 0 {
        EVENTS_EMITTED_TOTAL
            .with_label_values(&[event])
            .inc_by(deliveries as u64);
    }
}

pub fn record_message_relayed() {
    MESSAGES_RELAYED_TOTAL.inc();
}

pub fn record_persist_outcome(outcome: &str) {
    PERSIST_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_payload_error(code: &str) {
    PAYLOAD_ERRORS_TOTAL.with_label_values(&[code]).inc();
}
