//! Response handling.
//!
//! # Responsibilities
//! - Relay the backend subrequest's status and body to the client
//! - Map hook failures to gateway status codes
//!
//! # Design Decisions
//! - Only status and body are relayed; backend headers are not copied
//! - Backend timeouts result in 504 Gateway Timeout, other failures in 502

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::hook::HookError;
use crate::subrequest::SubrequestResponse;

/// Client response carrying exactly the backend's status and body.
pub fn relay(backend: SubrequestResponse) -> Response {
    let mut response = Response::new(Body::from(backend.body));
    *response.status_mut() = backend.status;
    response
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        match self {
            HookError::Backend(e) if e.is_timeout() => {
                tracing::error!(error = %e, "Backend subrequest timed out");
                (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
            }
            HookError::Backend(e) => {
                tracing::error!(error = %e, "Backend subrequest failed");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subrequest::SubrequestError;
    use axum::body::Bytes;
    use std::time::Duration;

    #[tokio::test]
    async fn test_relay_is_verbatim() {
        let response = relay(SubrequestResponse {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(b"not found"),
        });

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("content-type").is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"not found");
    }

    #[test]
    fn test_error_status_mapping() {
        let timeout = HookError::Backend(SubrequestError::Timeout(Duration::from_secs(1)));
        assert_eq!(timeout.into_response().status(), StatusCode::GATEWAY_TIMEOUT);

        let missing = HookError::Backend(SubrequestError::NoLocation("/_x".into()));
        assert_eq!(missing.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
