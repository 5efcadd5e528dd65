//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the hook handler on every path
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener
//! - Apply reloaded configuration between requests
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ForwardConfig, HookConfig};
use crate::hook::Forwarder;
use crate::http::{request, response};
use crate::observability::{metrics, span};
use crate::subrequest::upstream::{build_http_client, HttpClient};
use crate::subrequest::{UpstreamClient, UpstreamSettings};

/// The reloadable part of the configuration, as seen by one request.
#[derive(Debug)]
pub struct Runtime {
    pub forward: ForwardConfig,
    pub upstream: Arc<UpstreamSettings>,
}

impl Runtime {
    pub fn from_config(config: &HookConfig) -> Self {
        Self {
            forward: config.hook.clone(),
            upstream: Arc::new(UpstreamSettings::from_config(config)),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: HttpClient,
    pub runtime: Arc<ArcSwap<Runtime>>,
}

/// HTTP server fronting the hook.
pub struct HttpServer {
    router: Router,
    config: HookConfig,
    runtime: Arc<ArcSwap<Runtime>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: HookConfig) -> Self {
        let client = build_http_client(Duration::from_secs(config.timeouts.connect_secs));
        let runtime = Arc::new(ArcSwap::from_pointee(Runtime::from_config(&config)));

        let state = AppState {
            client,
            runtime: runtime.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            runtime,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &HookConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(hook_handler))
            .route("/{*path}", any(hook_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(request::set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        span::request_span(
                            span::request_id(req.headers()),
                            req.method(),
                            &request::request_uri(req.uri()),
                        )
                    }))
                    .layer(request::propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::GATEWAY_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            )
    }

    /// Run the server until `shutdown` fires, applying `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<HookConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_path = %self.config.hook.auth_path,
            backend_prefix = %self.config.hook.backend_prefix,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_updates(
            self.runtime.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Handle to the live runtime snapshot.
    pub fn runtime(&self) -> Arc<ArcSwap<Runtime>> {
        self.runtime.clone()
    }
}

/// Swap in each reloaded configuration. Settings baked into the listener or
/// middleware only take effect after a restart.
async fn apply_updates(
    runtime: Arc<ArcSwap<Runtime>>,
    startup: HookConfig,
    mut updates: mpsc::UnboundedReceiver<HookConfig>,
) {
    while let Some(config) = updates.recv().await {
        if config.listener.bind_address != startup.listener.bind_address
            || config.timeouts.request_secs != startup.timeouts.request_secs
            || config.timeouts.connect_secs != startup.timeouts.connect_secs
            || config.limits.max_body_bytes != startup.limits.max_body_bytes
        {
            tracing::warn!("Listener, connect timeout, request timeout and body limit changes require a restart");
        }

        runtime.store(Arc::new(Runtime::from_config(&config)));
        tracing::info!(
            auth_path = %config.hook.auth_path,
            backend_prefix = %config.hook.backend_prefix,
            locations = config.locations.len(),
            "Configuration reloaded"
        );
    }
}

/// Entry point for every inbound request.
async fn hook_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let method_label = metrics::method_label(&method);

    let runtime = state.runtime.load_full();
    let forwarder = Forwarder::new(
        UpstreamClient::new(state.client.clone(), runtime.upstream.clone()),
        runtime.forward.clone(),
    );

    let response = match forwarder
        .forward(request::inbound(method, &uri, headers, body))
        .await
    {
        Ok(backend) => response::relay(backend),
        Err(e) => e.into_response(),
    };

    metrics::record_request(method_label, response.status().as_u16(), start_time);
    response
}
