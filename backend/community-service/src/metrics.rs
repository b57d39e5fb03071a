//! Prometheus metrics for community-service.
//!
//! Exposes live-update collectors and an HTTP handler for the `/metrics`
//! endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

lazy_static! {
    /// Live-update sessions opened since boot.
    pub static ref LIVE_SESSIONS_OPENED: IntCounter = register_int_counter!(
        "live_sessions_opened_total",
        "Live-update sessions opened"
    )
    .expect("failed to register live_sessions_opened_total");

    /// Poll ticks segmented by outcome (emitted, empty, error).
    pub static ref LIVE_POLL_TICKS: IntCounterVec = register_int_counter_vec!(
        "live_poll_ticks_total",
        "Live-update poll ticks segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register live_poll_ticks_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
