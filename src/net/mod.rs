//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: tokio TcpListener served by axum
//!     → tls.rs: rustls handshake served by axum-server
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - One listener per process, HTTP or HTTPS, never both
//! - TLS is used only when both certificate and key are configured

pub mod tls;

pub use tls::load_tls_config;
