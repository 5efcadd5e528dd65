//! HTTP implementation of the subrequest primitive.
//!
//! # Responsibilities
//! - Resolve internal paths to upstream URIs via the location table
//! - Forward method, headers and body to the upstream
//! - Enforce the per-subrequest deadline
//! - Buffer the upstream response body up to a size limit

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::HookConfig;
use crate::observability::metrics;
use crate::routing::LocationTable;
use crate::subrequest::{Subrequest, SubrequestError, SubrequestRequest, SubrequestResponse};

/// Shared HTTP client type used for every subrequest.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the upstream HTTP client.
pub fn build_http_client(connect_timeout: Duration) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Reloadable settings the client resolves subrequests with.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub locations: LocationTable,
    pub timeout: Duration,
    pub max_response_body_bytes: usize,
}

impl UpstreamSettings {
    pub fn from_config(config: &HookConfig) -> Self {
        Self {
            locations: LocationTable::from_config(&config.locations),
            timeout: Duration::from_secs(config.timeouts.subrequest_secs),
            max_response_body_bytes: config.limits.max_response_body_bytes,
        }
    }
}

/// Issues subrequests to the upstream owning each internal location.
#[derive(Clone)]
pub struct UpstreamClient {
    http: HttpClient,
    settings: Arc<UpstreamSettings>,
}

impl UpstreamClient {
    pub fn new(http: HttpClient, settings: Arc<UpstreamSettings>) -> Self {
        Self { http, settings }
    }

    async fn exchange(
        &self,
        request: SubrequestRequest,
    ) -> Result<SubrequestResponse, SubrequestError> {
        let target = self
            .settings
            .locations
            .resolve(&request.path)
            .ok_or_else(|| SubrequestError::NoLocation(request.path.clone()))?;
        let uri: Uri = target
            .parse()
            .map_err(|source| SubrequestError::InvalidUri {
                uri: target.clone(),
                source,
            })?;

        tracing::trace!(kind = request.kind.as_str(), path = %request.path, upstream = %uri, "Resolved subrequest");

        let mut builder = Request::builder().method(request.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }
        let upstream_request = builder.body(Body::from(request.body))?;

        let response = self.http.request(upstream_request).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.settings.max_response_body_bytes)
            .await
            .map_err(SubrequestError::Body)?;

        Ok(SubrequestResponse {
            status: parts.status,
            body,
        })
    }
}

impl Subrequest for UpstreamClient {
    async fn send(
        &self,
        request: SubrequestRequest,
    ) -> Result<SubrequestResponse, SubrequestError> {
        let start = Instant::now();
        let kind = request.kind;
        let deadline = self.settings.timeout;

        let result = match tokio::time::timeout(deadline, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(SubrequestError::Timeout(deadline)),
        };

        let status = match &result {
            Ok(response) => response.status.as_u16(),
            Err(e) if e.is_timeout() => 504,
            Err(_) => 502,
        };
        metrics::record_subrequest(kind.as_str(), status, start);

        result
    }
}
