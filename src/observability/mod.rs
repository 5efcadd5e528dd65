//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP front and subrequest client produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → span.rs (per-request span carrying the request ID)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every log line of a request
//! - Metrics are cheap; the exporter is optional

pub mod logging;
pub mod metrics;
pub mod span;
