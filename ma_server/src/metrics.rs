//! Prometheus metrics for monitoring platform health and usage.
//!
//! Metrics are exposed in Prometheus text format for scraping by monitoring
//! systems, on a dedicated listener configured via `METRICS_BIND`.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Auth Metrics**: Login attempts, registrations
//! - **Subscription Metrics**: Code redemptions, gate verdicts
//! - **Upload Metrics**: Course asset upload outcomes

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment registrations counter.
pub fn registrations_total() {
    metrics::counter!("registrations_total").increment(1);
}

// ============================================================================
// Subscription Metrics
// ============================================================================

/// Increment activation code redemption counter.
pub fn code_redemptions_total(success: bool) {
    metrics::counter!("code_redemptions_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment lesson gate verdict counter.
pub fn lesson_gate_verdicts_total(verdict: &str) {
    metrics::counter!("lesson_gate_verdicts_total",
        "verdict" => verdict.to_string()
    )
    .increment(1);
}

// ============================================================================
// Upload Metrics
// ============================================================================

/// Increment course asset upload counter.
pub fn asset_uploads_total(outcome: &str) {
    metrics::counter!("asset_uploads_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
