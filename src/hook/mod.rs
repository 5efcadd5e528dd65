//! The authorization hook.
//!
//! # Data Flow
//! ```text
//! InboundRequest { method M, uri U, headers, body B }
//!     → forwarder.rs: subrequest(auth_path, M, B)            (awaited, result unused)
//!     → rewrite.rs:   backend_prefix + U minus one trailing '/'
//!     → forwarder.rs: subrequest(backend path, M, B)         (awaited)
//!     → backend (status, body) relayed to the client
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: the backend subrequest starts after the auth one completes
//! - The authorization outcome never gates the backend call
//! - No state survives a request; every call builds its own sequence

pub mod forwarder;
pub mod rewrite;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use thiserror::Error;

use crate::subrequest::SubrequestError;

pub use forwarder::Forwarder;
pub use rewrite::{backend_path, subrequest_headers};

/// The inbound request as seen by the hook.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Path and query exactly as received.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Failure of the hook to produce a backend response.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("backend subrequest failed: {0}")]
    Backend(#[source] SubrequestError),
}
