//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (route id = first segment, lowercased)
//!     → router.rs (route table lookup)
//!     → Return: RouteEntry or NoMatch
//!     → matcher.rs (rewrite path onto target.path)
//!
//! Route Compilation (at startup):
//!     RouteDocument + RouteOverride[]
//!     → target.rs (resolve URLs)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - O(log n) lookup by id, no pattern matching in the hot path
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;
pub mod target;

pub use router::{RouteEntry, RouteTable};
pub use target::{Target, TargetError};
