//! Two-step request forwarding.

use crate::config::ForwardConfig;
use crate::hook::rewrite::{backend_path, subrequest_headers};
use crate::hook::{HookError, InboundRequest};
use crate::subrequest::{Subrequest, SubrequestKind, SubrequestRequest, SubrequestResponse};

/// Sends every inbound request to the authorization location, then to the
/// backend location, and yields the backend's answer.
pub struct Forwarder<S> {
    subrequest: S,
    config: ForwardConfig,
}

impl<S: Subrequest> Forwarder<S> {
    pub fn new(subrequest: S, config: ForwardConfig) -> Self {
        Self { subrequest, config }
    }

    /// Run the auth subrequest, then the backend subrequest, and return the latter.
    pub async fn forward(&self, request: InboundRequest) -> Result<SubrequestResponse, HookError> {
        let InboundRequest {
            method,
            uri,
            headers,
            body,
        } = request;

        tracing::info!(method = %method, uri = %uri, body_bytes = body.len(), "Hook request received");

        let headers = subrequest_headers(&headers);

        tracing::info!(path = %self.config.auth_path, "Sending authorization subrequest");
        let auth = self
            .subrequest
            .send(SubrequestRequest {
                kind: SubrequestKind::Auth,
                path: self.config.auth_path.clone(),
                method: method.clone(),
                headers: headers.clone(),
                body: body.clone(),
            })
            .await;
        match &auth {
            Ok(response) => {
                tracing::info!(status = response.status.as_u16(), "Authorization subrequest answered")
            }
            Err(e) => tracing::warn!(error = %e, "Authorization subrequest failed, continuing"),
        }

        let path = backend_path(&self.config.backend_prefix, &uri);
        tracing::info!(path = %path, "Sending backend subrequest");
        let backend = self
            .subrequest
            .send(SubrequestRequest {
                kind: SubrequestKind::Backend,
                path,
                method,
                headers,
                body,
            })
            .await;
        match &backend {
            Ok(response) => tracing::info!(
                status = response.status.as_u16(),
                body_bytes = response.body.len(),
                "Backend subrequest answered"
            ),
            Err(e) => tracing::warn!(error = %e, "Backend subrequest failed"),
        }

        backend.map_err(HookError::Backend)
    }
}
