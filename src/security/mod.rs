//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Routed request:
//!     → access_control.rs (authorization → cookie → api-key presence)
//!     → Pass to proxy, or 401/403
//! ```
//!
//! # Design Decisions
//! - Presence checks only; credentials are validated by the upstream
//! - Fail closed: the first failing gate rejects the request

pub mod access_control;

pub use access_control::{check, Denial};
