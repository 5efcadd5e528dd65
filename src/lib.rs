//! Authorization hook: every inbound request is sent to an authorization
//! location, then to a backend location, and the backend's answer is relayed.

pub mod config;
pub mod hook;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod subrequest;

pub use config::HookConfig;
pub use hook::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
