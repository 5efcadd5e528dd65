//! Path and header rewriting for subrequests.

use axum::http::{header, HeaderMap, HeaderName};

/// Hop-by-hop headers never copied onto a subrequest.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Backend subrequest path: `prefix` followed by `uri` with one trailing '/' removed.
///
/// The rule applies to the raw path-and-query, so "/a/?x=1" keeps its slash.
pub fn backend_path(prefix: &str, uri: &str) -> String {
    let trimmed = uri.strip_suffix('/').unwrap_or(uri);
    format!("{}{}", prefix, trimmed)
}

/// Inbound headers as inherited by a subrequest.
///
/// Drops hop-by-hop headers, anything listed in `Connection`, `Host` (the
/// upstream URI supplies it) and `Content-Length` (recomputed from the body).
pub fn subrequest_headers(inbound: &HeaderMap) -> HeaderMap {
    let listed: Vec<HeaderName> = inbound
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if HOP_BY_HOP.contains(&name.as_str())
            || listed.contains(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
