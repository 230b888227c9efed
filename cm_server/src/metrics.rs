//! Prometheus metrics for monitoring authentication traffic.
//!
//! Metrics are exposed in Prometheus text format when an exporter address is
//! configured. Without one, the recording calls below are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cm_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record HTTP request.
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment registrations counter.
pub fn registrations_total(success: bool) {
    metrics::counter!("registrations_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment counter of requests refused by the session middleware.
pub fn session_rejections_total(reason: &'static str) {
    metrics::counter!("session_rejections_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        http_requests_total("GET", 200);
        login_attempts_total(false);
        registrations_total(true);
        session_rejections_total("expired");
    }
}
