//! HTTP API server for the nursing-education platform.
//!
//! Wires the [`medacademy`] managers into a versioned axum REST API with
//! JWT authentication, an admin surface gated by a configured email
//! allowlist, and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
