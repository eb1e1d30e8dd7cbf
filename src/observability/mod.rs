//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and aggregator produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → correlation.rs (ids attached to spans)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every request gets a correlation id before anything is logged
//! - Metrics are cheap (atomic increments) and off unless an address is set

pub mod correlation;
pub mod logging;
pub mod metrics;

pub use correlation::CorrelationId;
