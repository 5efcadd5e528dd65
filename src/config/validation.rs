//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (hook paths resolve to a location)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Detect duplicate location prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HookConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::HookConfig;
use crate::routing::LocationTable;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),
    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
    #[error("{field} '{value}' must start with '/'")]
    NotAbsolutePath { field: &'static str, value: String },
    #[error("location prefix '{0}' must start with '/'")]
    LocationPrefix(String),
    #[error("location '{prefix}' has invalid upstream '{upstream}': {reason}")]
    Upstream {
        prefix: String,
        upstream: String,
        reason: String,
    },
    #[error("location prefix '{0}' is declared more than once")]
    DuplicatePrefix(String),
    #[error("{field} '{path}' does not resolve to any location")]
    Unresolved { field: &'static str, path: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &HookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (field, value) in [
        ("hook.auth_path", &config.hook.auth_path),
        ("hook.backend_prefix", &config.hook.backend_prefix),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::NotAbsolutePath {
                field,
                value: value.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for location in &config.locations {
        if !location.prefix.starts_with('/') {
            errors.push(ValidationError::LocationPrefix(location.prefix.clone()));
        }
        if !seen.insert(location.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(location.prefix.clone()));
        }
        if let Err(reason) = check_upstream(&location.upstream) {
            errors.push(ValidationError::Upstream {
                prefix: location.prefix.clone(),
                upstream: location.upstream.clone(),
                reason,
            });
        }
    }

    let table = LocationTable::from_config(&config.locations);
    for (field, path) in [
        ("hook.auth_path", &config.hook.auth_path),
        ("hook.backend_prefix", &config.hook.backend_prefix),
    ] {
        if table.find(path).is_none() {
            errors.push(ValidationError::Unresolved {
                field,
                path: path.clone(),
            });
        }
    }

    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.subrequest_secs", config.timeouts.subrequest_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("limits.max_body_bytes", config.limits.max_body_bytes as u64),
        (
            "limits.max_response_body_bytes",
            config.limits.max_response_body_bytes as u64,
        ),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_upstream(upstream: &str) -> Result<(), String> {
    let url = Url::parse(upstream).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}
