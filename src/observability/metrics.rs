//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_chat_sessions_total` (counter): sessions opened, by transport kind
//! - `gateway_chat_sessions_closed_total` (counter): by kind and close reason
//! - `gateway_chat_sessions_active` (gauge): currently registered sessions
//! - `gateway_chat_messages_total` (counter): replies written, by kind
//! - `gateway_chat_malformed_messages_total` (counter): frames dropped as undecodable
//! - `gateway_upstream_requests_total` (counter): by endpoint and outcome
//! - `gateway_upstream_request_duration_seconds` (histogram): by endpoint
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_session_opened(kind: &'static str) {
    metrics::counter!("gateway_chat_sessions_total", "kind" => kind).increment(1);
}

pub fn record_session_closed(kind: &'static str, reason: &'static str) {
    metrics::counter!("gateway_chat_sessions_closed_total", "kind" => kind, "reason" => reason)
        .increment(1);
}

pub fn set_active_sessions(count: usize) {
    metrics::gauge!("gateway_chat_sessions_active").set(count as f64);
}

pub fn record_chat_reply(kind: &'static str) {
    metrics::counter!("gateway_chat_messages_total", "kind" => kind).increment(1);
}

pub fn record_malformed_message(kind: &'static str) {
    metrics::counter!("gateway_chat_malformed_messages_total", "kind" => kind).increment(1);
}

pub fn record_upstream_call(endpoint: &'static str, outcome: &'static str, started: Instant) {
    metrics::counter!("gateway_upstream_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("gateway_upstream_request_duration_seconds", "endpoint" => endpoint)
        .record(started.elapsed().as_secs_f64());
}
