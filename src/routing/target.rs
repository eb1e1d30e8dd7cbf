//! Upstream target resolution.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Resolved upstream location for a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Target {
    /// Authority: host plus optional port.
    pub host: String,

    /// Base path, always starting with `/`.
    #[serde(default = "root_path")]
    pub path: String,

    /// Use https for the upstream leg.
    #[serde(default)]
    pub secure: bool,
}

fn root_path() -> String {
    "/".to_string()
}

/// Why a URL could not become a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("not a valid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme '{0}', expected http or https")]
    Scheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("path must start with '/'")]
    RelativePath,
}

impl Target {
    /// Derive a target from an `http(s)://authority/path` string.
    ///
    /// The path is the URL parser's normalized form: `.` and `..` segments
    /// are resolved, unsafe characters are percent-encoded, and any query or
    /// fragment is dropped.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw.trim())?;

        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(TargetError::Scheme(other.to_string())),
        };

        let host = url.host_str().filter(|h| !h.is_empty()).ok_or(TargetError::MissingHost)?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            host,
            path: url.path().to_string(),
            secure,
        })
    }

    /// Check the invariants of a target that was deserialized directly.
    pub fn validate(&self) -> Result<(), TargetError> {
        if self.host.trim().is_empty() {
            return Err(TargetError::MissingHost);
        }
        if !self.path.starts_with('/') {
            return Err(TargetError::RelativePath);
        }
        Ok(())
    }

    /// `http` or `https`.
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Scheme and authority, without a path.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme(), self.host)
    }

    /// The OpenAPI location used when a route does not name one.
    pub fn default_open_api_url(&self) -> String {
        format!("{}/open-api", self.origin())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.path)
    }
}
