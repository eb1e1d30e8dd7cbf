//! Simple API gateway library.
//!
//! Routes requests by their first path segment to configured upstreams,
//! gates them on credential presence, streams bodies in both directions and
//! optionally merges the upstreams' OpenAPI documents into one.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Documentation aggregation
pub mod openapi;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::{Gateway, Shutdown};

/// Gateway name reported on `GET /`.
pub const GATEWAY_NAME: &str = env!("CARGO_PKG_NAME");

/// Gateway version reported on `GET /` and in the OpenAPI document.
pub const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");
