//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port non-zero, refresh interval > 0)
//! - Check CORS methods against the allowed set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{GatewayConfig, ALLOWED_METHODS};

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be between 1 and 65535"));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() || tls.key_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls", "certificate and key paths are both required"));
        }
    }

    if config.cors.origin.trim().is_empty() {
        errors.push(ValidationError::new("cors.origin", "must not be empty"));
    }
    for method in &config.cors.methods {
        if !ALLOWED_METHODS.contains(&method.as_str()) {
            errors.push(ValidationError::new(
                "cors.methods",
                format!("{method} is not one of {}", ALLOWED_METHODS.join(",")),
            ));
        }
    }

    if config.open_api.enabled && config.open_api.interval_ms == 0 {
        errors.push(ValidationError::new("open_api.interval_ms", "must be greater than zero"));
    }

    if let Some(address) = &config.observability.metrics_address {
        if address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("{address} is not a socket address"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
