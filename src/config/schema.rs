//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the gateway.
//! All types derive Serde traits for deserialization from a TOML settings
//! file; the environment overlay in [`crate::config::loader`] writes into the
//! same structs.

use serde::{Deserialize, Serialize};

/// Methods that may appear in the CORS allow-list for routed paths.
pub const ALLOWED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Route document location.
    pub routes: RoutesConfig,

    /// CORS answers for routed paths.
    pub cors: CorsConfig,

    /// Credential gate settings.
    pub auth: AuthConfig,

    /// OpenAPI aggregation settings.
    pub open_api: OpenApiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Where the route document lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path to the JSON route document. A missing file means no document routes.
    pub file: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            file: "routes.json".to_string(),
        }
    }
}

/// CORS preflight answers for routed paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value for `Access-Control-Allow-Origin`.
    pub origin: String,

    /// Upper-cased methods from [`ALLOWED_METHODS`]. Empty disables the answer.
    pub methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
            methods: Vec::new(),
        }
    }
}

/// Credential gate settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the cookie routes with a cookie requirement expect.
    /// Informational: the gate only checks the `Cookie` header is non-empty.
    pub cookie_name: String,
}

/// OpenAPI aggregation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Enable the background merge task.
    pub enabled: bool,

    /// Refresh interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 60_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Prometheus exporter bind address. `None` disables the exporter.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "simple_gateway=info,tower_http=info".to_string(),
            metrics_address: None,
        }
    }
}
