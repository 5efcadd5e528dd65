//! Location lookup.
//!
//! # Responsibilities
//! - Store compiled internal locations
//! - Look up the location serving a subrequest path
//! - Build the absolute upstream URI for that path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan (acceptable for a handful of locations)
//! - Explicit no-match rather than silent default

use url::Url;

use crate::config::LocationConfig;
use crate::routing::matcher::PrefixMatcher;

/// A compiled internal location.
#[derive(Debug, Clone)]
pub struct Location {
    matcher: PrefixMatcher,
    /// Scheme and authority of the upstream, e.g. "http://127.0.0.1:8181".
    origin: String,
    /// Upstream base path without a trailing '/'.
    base_path: String,
    strip_prefix: bool,
}

impl Location {
    /// Compile a location from config. Returns `None` if the upstream is not a URL.
    pub fn from_config(config: &LocationConfig) -> Option<Self> {
        let url = Url::parse(&config.upstream).ok()?;
        if url.host_str().is_none() {
            return None;
        }
        Some(Self {
            matcher: PrefixMatcher::new(config.prefix.clone()),
            origin: url.origin().ascii_serialization(),
            base_path: url.path().trim_end_matches('/').to_string(),
            strip_prefix: config.strip_prefix,
        })
    }

    /// The internal prefix this location serves.
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// Absolute upstream URI for `path`, if this location serves it.
    pub fn target(&self, path: &str) -> Option<String> {
        let rest = if self.strip_prefix {
            self.matcher.remainder(path)?
        } else if self.matcher.matches(path) {
            path
        } else {
            return None;
        };

        let mut upstream_path = format!("{}{}", self.base_path, rest);
        if !upstream_path.starts_with('/') {
            upstream_path.insert(0, '/');
        }
        Some(format!("{}{}", self.origin, upstream_path))
    }
}

/// Immutable table of internal locations, longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    /// Compile the table from configuration.
    ///
    /// Locations whose upstream cannot be parsed are skipped with a warning;
    /// validation rejects them before a config is accepted.
    pub fn from_config(configs: &[LocationConfig]) -> Self {
        let mut locations: Vec<Location> = configs
            .iter()
            .filter_map(|config| {
                let location = Location::from_config(config);
                if location.is_none() {
                    tracing::warn!(
                        prefix = %config.prefix,
                        upstream = %config.upstream,
                        "Skipping location with invalid upstream"
                    );
                }
                location
            })
            .collect();

        // Stable sort keeps declaration order among equal lengths.
        locations.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));

        Self { locations }
    }

    /// Find the location serving `path`.
    pub fn find(&self, path: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.matcher.matches(path))
    }

    /// Resolve `path` to an absolute upstream URI.
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.find(path).and_then(|l| l.target(path))
    }

    /// Number of compiled locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the table has no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
