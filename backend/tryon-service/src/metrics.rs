//! Prometheus metrics for tryon-service.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Try-on requests segmented by provider and outcome.
    pub static ref TRYON_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "tryon_requests_total",
        "Try-on requests segmented by provider and outcome",
        &["provider", "outcome"]
    )
    .expect("failed to register tryon_requests_total");

    /// Credential checkouts segmented by provider.
    pub static ref CREDENTIAL_CHECKOUTS: IntCounterVec = register_int_counter_vec!(
        "credential_checkouts_total",
        "Credential pool checkouts segmented by provider",
        &["provider"]
    )
    .expect("failed to register credential_checkouts_total");

    /// Garment cache events (hit/miss).
    pub static ref GARMENT_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "garment_cache_events_total",
        "Garment cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register garment_cache_events_total");
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
