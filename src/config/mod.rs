//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (environment snapshot, case-insensitive overlay)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! route document (JSON) + ROUTE_<ID> overrides
//!     → routes.rs (document model)
//!     → routing::RouteTable (resolved, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod routes;
pub mod schema;
pub mod validation;

pub use env::{Environment, Restriction, RouteOverride};
pub use loader::ConfigError;
pub use routes::{Requirements, RouteDocument, RouteSpec, TargetSpec};
pub use schema::{
    AuthConfig, CorsConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, OpenApiConfig,
    RoutesConfig, TlsConfig,
};
