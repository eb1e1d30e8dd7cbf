//! OpenAPI aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable (at startup)
//!     → aggregator.rs (group routes by OpenAPI URL)
//!
//! Every interval:
//!     → fetch all sources concurrently
//!     → document.rs (merge paths into the working document)
//!     → snapshot.rs (atomic publish of the serialized document)
//!
//! GET /open-api
//!     → snapshot.rs (load current snapshot)
//! ```
//!
//! # Design Decisions
//! - The working document is owned by the aggregator task only
//! - Readers never observe a partially merged cycle
//! - A failed source never blocks the rest of the cycle

pub mod aggregator;
pub mod document;
pub mod snapshot;

pub use aggregator::{document_groups, CycleReport, DocumentGroup, FetchError, GroupMember, OpenApiAggregator};
pub use document::{AggregatedDoc, BUILTIN_PATHS};
pub use snapshot::DocSnapshot;
