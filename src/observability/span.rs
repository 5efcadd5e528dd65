//! Per-request spans.

use axum::http::{HeaderMap, Method};
use tracing::Span;

use crate::http::X_REQUEST_ID;

/// Request ID carried by `headers`, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span wrapping every log line emitted while handling one inbound request.
pub fn request_span(request_id: &str, method: &Method, uri: &str) -> Span {
    tracing::info_span!("hook", request_id = %request_id, method = %method, uri = %uri)
}
