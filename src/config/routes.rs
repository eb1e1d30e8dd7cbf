//! Route document model.
//!
//! The route document is a JSON object keyed by route id:
//! ```json
//! {
//!   "billing": {
//!     "target": "https://billing.internal/v1",
//!     "open-api": "https://billing.internal/open-api",
//!     "require": { "authorization": true, "cookie": false, "api-key": false }
//!   }
//! }
//! ```
//! `target` may also be an explicit `{ "host", "path", "secure" }` object.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::routing::Target;

/// Parsed route document, keyed by route id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RouteDocument {
    pub routes: BTreeMap<String, RouteSpec>,
}

/// One route as written in the document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteSpec {
    /// Upstream target. Required; checked when the route table is built.
    #[serde(default)]
    pub target: Option<TargetSpec>,

    /// Credential requirements. Older generators wrote `required`.
    #[serde(default, alias = "required")]
    pub require: Requirements,

    /// Explicit OpenAPI document URL.
    #[serde(rename = "open-api", default, skip_serializing_if = "Option::is_none")]
    pub open_api: Option<String>,
}

/// A target either as a URL string or already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Url(String),
    Resolved(Target),
}

/// Per-route credential presence checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Requirements {
    pub authorization: bool,
    pub cookie: bool,
    #[serde(rename = "api-key")]
    pub api_key: bool,
}

impl RouteDocument {
    /// Parse a document from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::RouteDocument)
    }

    /// Load a document from disk. A missing file yields an empty document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No route document found");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// Write the document to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::RouteDocument)?;
        fs::write(path, content).map_err(ConfigError::Io)
    }
}
