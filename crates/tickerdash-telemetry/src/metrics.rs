//! Prometheus metrics for tickerdash.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means a duplicate metric
//! name, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, register_int_counter,
    register_int_gauge, CounterVec, Encoder, Gauge, HistogramVec, IntCounter, IntGauge,
    TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// REST requests by endpoint and outcome (ok/http/timeout/network/decode).
pub static API_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickerdash_api_requests_total",
        "Total REST requests by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .unwrap()
});

/// REST round-trip latency.
pub static API_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tickerdash_api_latency_ms",
        "REST request latency in milliseconds",
        &["endpoint"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 15000.0]
    )
    .unwrap()
});

/// Push channel connection state (1 = connected).
pub static PUSH_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "tickerdash_push_connected",
        "Push channel connection state (1=connected)"
    )
    .unwrap()
});

/// Push events received by kind.
pub static PUSH_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickerdash_push_events_total",
        "Push channel events received",
        &["event"]
    )
    .unwrap()
});

/// Push reconnection attempts.
pub static PUSH_RECONNECT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickerdash_push_reconnect_total",
        "Push channel reconnection attempts"
    )
    .unwrap()
});

/// Layout writes to storage.
pub static LAYOUT_SAVES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickerdash_layout_saves_total",
        "Dashboard layout saves"
    )
    .unwrap()
});

/// Widgets currently mounted.
pub static WIDGETS_MOUNTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("tickerdash_widgets_mounted", "Widgets currently mounted").unwrap()
});

/// Auto-refresh ticks by result (ran/skipped).
pub static AUTO_REFRESH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickerdash_auto_refresh_total",
        "Auto-refresh ticks by result",
        &["result"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a finished REST request.
    pub fn api_request(endpoint: &str, outcome: &str, latency_ms: f64) {
        API_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
        API_LATENCY_MS
            .with_label_values(&[endpoint])
            .observe(latency_ms);
    }

    pub fn push_connected() {
        PUSH_CONNECTED.set(1.0);
    }

    pub fn push_disconnected() {
        PUSH_CONNECTED.set(0.0);
    }

    pub fn push_event(event: &str) {
        PUSH_EVENTS_TOTAL.with_label_values(&[event]).inc();
    }

    pub fn push_reconnect() {
        PUSH_RECONNECT_TOTAL.inc();
    }

    pub fn layout_saved() {
        LAYOUT_SAVES_TOTAL.inc();
    }

    pub fn widget_mounted() {
        WIDGETS_MOUNTED.inc();
    }

    pub fn widget_unmounted() {
        WIDGETS_MOUNTED.dec();
    }

    pub fn auto_refresh(result: &str) {
        AUTO_REFRESH_TOTAL.with_label_values(&[result]).inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
