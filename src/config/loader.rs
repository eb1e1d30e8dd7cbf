//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::env::Environment;
use crate::config::schema::{GatewayConfig, TlsConfig, ALLOWED_METHODS};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_HTTP_PORT: &str = "SERVICE_HTTP_PORT";
pub const ENV_HTTP_HOST: &str = "SERVICE_HTTP_HOST";
pub const ENV_HTTPS_CERT: &str = "SERVICE_HTTPS_CERT";
pub const ENV_HTTPS_KEY: &str = "SERVICE_HTTPS_KEY";
pub const ENV_TARGET_ORIGIN: &str = "ROUTES_TARGET_ORIGIN";
pub const ENV_TARGET_METHODS: &str = "ROUTES_TARGET_METHODS";
pub const ENV_COOKIE_NAME: &str = "REQUIRED_COOKIE_NAME";
pub const ENV_OPEN_API_MERGING: &str = "SERVICE_OPEN_API_MERGING";
pub const ENV_OPEN_API_FREQUENCY: &str = "SERVICE_OPEN_API_FREQUENCY";
pub const ENV_ROUTES_FILE: &str = "SERVICE_ROUTES_FILE";
pub const ENV_METRICS_ADDRESS: &str = "SERVICE_METRICS_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Route document error: {0}")]
    RouteDocument(#[source] serde_json::Error),

    #[error("{0} has no target defined.")]
    MissingTarget(String),

    #[error("Route {route} has an invalid target '{target}': {reason}")]
    InvalidTarget {
        route: String,
        target: String,
        reason: String,
    },

    #[error("Invalid value '{value}' for {key}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML settings file without validating it.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the final settings: optional TOML file, then environment overrides,
/// then validation.
pub fn load(path: Option<&Path>, env: &Environment) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    apply_environment(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay named environment settings onto `config`.
pub fn apply_environment(config: &mut GatewayConfig, env: &Environment) -> Result<(), ConfigError> {
    if let Some(port) = non_empty(env, ENV_HTTP_PORT) {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::InvalidSetting {
            key: ENV_HTTP_PORT,
            value: port.to_string(),
        })?;
    }
    if let Some(host) = non_empty(env, ENV_HTTP_HOST) {
        config.listener.host = host.to_string();
    }

    let existing = config.listener.tls.take();
    let cert = non_empty(env, ENV_HTTPS_CERT)
        .map(str::to_string)
        .or_else(|| existing.as_ref().map(|tls| tls.cert_path.clone()));
    let key = non_empty(env, ENV_HTTPS_KEY)
        .map(str::to_string)
        .or_else(|| existing.as_ref().map(|tls| tls.key_path.clone()));
    config.listener.tls = match (cert, key) {
        (Some(cert_path), Some(key_path)) => Some(TlsConfig { cert_path, key_path }),
        (None, None) => None,
        (Some(cert), None) => {
            return Err(ConfigError::InvalidSetting { key: ENV_HTTPS_KEY, value: format!("unset while certificate is {cert}") })
        }
        (None, Some(key)) => {
            return Err(ConfigError::InvalidSetting { key: ENV_HTTPS_CERT, value: format!("unset while key is {key}") })
        }
    };

    if let Some(origin) = non_empty(env, ENV_TARGET_ORIGIN) {
        config.cors.origin = origin.to_string();
    }
    if let Some(methods) = env.get(ENV_TARGET_METHODS) {
        config.cors.methods = parse_methods(methods);
    }
    if let Some(cookie_name) = env.get(ENV_COOKIE_NAME) {
        config.auth.cookie_name = cookie_name.to_string();
    }

    if let Some(flag) = env.get(ENV_OPEN_API_MERGING) {
        config.open_api.enabled = flag.trim().eq_ignore_ascii_case("true");
    }
    if let Some(frequency) = non_empty(env, ENV_OPEN_API_FREQUENCY) {
        config.open_api.interval_ms = frequency.trim().parse().map_err(|_| ConfigError::InvalidSetting {
            key: ENV_OPEN_API_FREQUENCY,
            value: frequency.to_string(),
        })?;
    }

    if let Some(file) = non_empty(env, ENV_ROUTES_FILE) {
        config.routes.file = file.to_string();
    }
    if let Some(address) = non_empty(env, ENV_METRICS_ADDRESS) {
        config.observability.metrics_address = Some(address.to_string());
    }

    Ok(())
}

/// Split a comma list of methods, upper-case it and keep only allowed methods.
pub fn parse_methods(raw: &str) -> Vec<String> {
    let mut methods = Vec::new();
    for method in raw.split(',').map(|m| m.trim().to_uppercase()).filter(|m| !m.is_empty()) {
        if !ALLOWED_METHODS.contains(&method.as_str()) {
            tracing::warn!(method = %method, "Dropping method not allowed for CORS");
            continue;
        }
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    methods
}

fn non_empty<'a>(env: &'a Environment, key: &str) -> Option<&'a str> {
    env.get(key).filter(|value| !value.trim().is_empty())
}
