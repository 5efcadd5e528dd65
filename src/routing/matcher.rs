//! Prefix matching for internal locations.
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - A prefix only matches on a segment boundary: "/_opa" matches "/_opa",
//!   "/_opa/x" and "/_opa?x" but not "/_opax"
//! - A prefix ending in '/' matches anything below it

/// Matches a subrequest path against an internal location prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    /// Create a new prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` falls under this prefix.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => {
                self.prefix.ends_with('/')
                    || rest.is_empty()
                    || rest.starts_with('/')
                    || rest.starts_with('?')
            }
            None => false,
        }
    }

    /// The part of a matching `path` that follows the prefix.
    ///
    /// The separating '/' is kept so the remainder can be appended to a base path.
    pub fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        if !self.matches(path) {
            return None;
        }
        let cut = if self.prefix.ends_with('/') {
            self.prefix.len() - 1
        } else {
            self.prefix.len()
        };
        Some(&path[cut..])
    }
}
