//! Subrequest subsystem.
//!
//! # Data Flow
//! ```text
//! hook::Forwarder
//!     → Subrequest::send(internal path, method, headers, body)
//!     → upstream.rs (resolve location, issue HTTP request, buffer body)
//!     → SubrequestResponse { status, body }
//! ```
//!
//! # Design Decisions
//! - The forwarder only sees the `Subrequest` trait, so tests swap in fakes
//! - Responses are fully buffered; callers inspect them before replying
//! - Timeouts belong to the subrequest client, not to the forwarder

pub mod upstream;

use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

pub use upstream::{UpstreamClient, UpstreamSettings};

/// Which step of the hook a subrequest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubrequestKind {
    Auth,
    Backend,
}

impl SubrequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubrequestKind::Auth => "auth",
            SubrequestKind::Backend => "backend",
        }
    }
}

/// An internally issued request.
#[derive(Debug, Clone)]
pub struct SubrequestRequest {
    pub kind: SubrequestKind,
    /// Internal path, resolved against the location table.
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Status and buffered body of a completed subrequest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubrequestResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Failure to complete a subrequest.
#[derive(Debug, Error)]
pub enum SubrequestError {
    #[error("no location serves internal path '{0}'")]
    NoLocation(String),
    #[error("invalid upstream URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },
    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read upstream response body: {0}")]
    Body(#[source] axum::Error),
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

impl SubrequestError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SubrequestError::Timeout(_))
    }
}

/// The subrequest primitive the hook is built on: (path, method, body) → (status, body).
pub trait Subrequest: Send + Sync {
    fn send(
        &self,
        request: SubrequestRequest,
    ) -> impl Future<Output = Result<SubrequestResponse, SubrequestError>> + Send;
}
