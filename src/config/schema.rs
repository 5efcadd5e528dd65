//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hook.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the auth hook.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HookConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Internal paths the hook delegates to.
    pub hook: ForwardConfig,

    /// Internal locations mapping subrequest paths to upstreams.
    pub locations: Vec<LocationConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            hook: ForwardConfig::default(),
            locations: default_locations(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Internal subrequest targets used by the forwarder.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForwardConfig {
    /// Path of the authorization subrequest.
    pub auth_path: String,

    /// Prefix prepended to the inbound URI for the backend subrequest.
    pub backend_prefix: String,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            auth_path: "/_opa".to_string(),
            backend_prefix: "/_storm-tape".to_string(),
        }
    }
}

/// An internal location: subrequests under `prefix` go to `upstream`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LocationConfig {
    /// Internal path prefix (e.g., "/_opa").
    pub prefix: String,

    /// Absolute upstream base URL (e.g., "http://127.0.0.1:8181/v1/data").
    pub upstream: String,

    /// Drop the prefix before appending the remaining path to the upstream.
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,
}

fn default_strip_prefix() -> bool {
    true
}

fn default_locations() -> Vec<LocationConfig> {
    vec![
        LocationConfig {
            prefix: "/_opa".to_string(),
            upstream: "http://127.0.0.1:8181".to_string(),
            strip_prefix: true,
        },
        LocationConfig {
            prefix: "/_storm-tape".to_string(),
            upstream: "http://127.0.0.1:8000".to_string(),
            strip_prefix: true,
        },
    ]
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-subrequest timeout (send and read the full response) in seconds.
    pub subrequest_secs: u64,

    /// Inbound request timeout (both subrequests included) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            subrequest_secs: 60,
            request_secs: 60,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,

    /// Maximum buffered subrequest response body size in bytes.
    pub max_response_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,             // 1MB
            max_response_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
