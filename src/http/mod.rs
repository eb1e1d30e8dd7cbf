//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, shared state)
//!     → handler.rs (built-in endpoints, preflights, route lookup)
//!     → [security gates] → proxy.rs (streaming relay to the target)
//!     → response.rs (gateway-generated answers)
//!     → Send to client
//! ```

pub mod handler;
pub mod proxy;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
