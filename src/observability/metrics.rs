//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hook_requests_total` (counter): inbound requests by method, status
//!   (non-standard methods share the `other` label)
//! - `hook_request_duration_seconds` (histogram): end-to-end latency
//! - `hook_subrequests_total` (counter): subrequests by kind (auth/backend), status
//! - `hook_subrequest_duration_seconds` (histogram): subrequest latency by kind
//!
//! Failed subrequests are recorded with the status the client would see (502/504).

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Label for `method`, bounded to the standard methods.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::OPTIONS => "OPTIONS",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "other",
    }
}

/// Record a completed inbound request.
pub fn record_request(method: &'static str, status: u16, start: Instant) {
    counter!(
        "hook_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("hook_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record a completed subrequest.
pub fn record_subrequest(kind: &'static str, status: u16, start: Instant) {
    counter!(
        "hook_subrequests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("hook_subrequest_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_methods_keep_their_name() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::DELETE), "DELETE");
        assert_eq!(method_label(&Method::PATCH), "PATCH");
    }

    #[test]
    fn test_extension_methods_share_one_label() {
        let labels: Vec<_> = ["PURGE", "FOO1", "BAR2"]
            .iter()
            .map(|m| method_label(&Method::from_bytes(m.as_bytes()).unwrap()))
            .collect();
        assert_eq!(labels, vec!["other", "other", "other"]);
    }
}
