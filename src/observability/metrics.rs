//! Metrics collection and exposition.
//!
//! # Metrics
//! - `report_http_requests_total` (counter): requests by method, status
//! - `report_http_request_duration_seconds` (histogram): request latency
//! - `report_llm_attempts_total` (counter): upstream attempts by outcome
//! - `report_generations_total` (counter): generation outcomes
//! - `report_generation_duration_seconds` (histogram): time including retries
//! - `report_drafts` / `report_sessions` (gauges): store sizes

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "report_http_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "report_http_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_llm_attempt(outcome: &'static str) {
    metrics::counter!("report_llm_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_report(outcome: &'static str, start: Instant) {
    metrics::counter!("report_generations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("report_generation_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_draft_count(count: usize) {
    metrics::gauge!("report_drafts").set(count as f64);
}

pub fn record_session_count(count: usize) {
    metrics::gauge!("report_sessions").set(count as f64);
}

/// Middleware recording per-request counters and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
