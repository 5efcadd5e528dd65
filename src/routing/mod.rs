//! Internal location routing.
//!
//! # Data Flow
//! ```text
//! Subrequest path ("/_storm-tape/widgets?x=1")
//!     → router.rs (location lookup)
//!     → matcher.rs (evaluate prefix boundaries)
//!     → Return: absolute upstream URI or no match
//!
//! Table Compilation (at startup and on reload):
//!     LocationConfig[]
//!     → Parse upstream base URLs
//!     → Sort by prefix length (longest first)
//!     → Freeze as immutable LocationTable
//! ```
//!
//! # Design Decisions
//! - Tables compiled once, immutable at runtime, swapped whole on reload
//! - No regex in hot path (prefix matching only)
//! - Deterministic: longest matching prefix wins

pub mod matcher;
pub mod router;

pub use matcher::PrefixMatcher;
pub use router::{Location, LocationTable};
