//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Resolve document and environment routes into [`RouteEntry`] values
//! - Look up a route by id
//! - List route ids for the gateway overview
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Environment routes overwrite document routes with the same id
//! - A route without a target aborts startup

use std::collections::BTreeMap;

use crate::config::{ConfigError, Requirements, RouteDocument, RouteOverride, TargetSpec};
use crate::routing::Target;

/// A fully resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Lowercase id, the first path segment that selects this route.
    pub id: String,
    pub target: Target,
    pub require: Requirements,
    /// Where the upstream's OpenAPI document is fetched from.
    pub open_api_url: String,
}

impl RouteEntry {
    /// Create an entry whose OpenAPI URL is derived from the target.
    pub fn new(id: impl Into<String>, target: Target, require: Requirements) -> Self {
        let open_api_url = target.default_open_api_url();
        Self {
            id: id.into().to_lowercase(),
            target,
            require,
            open_api_url,
        }
    }

    /// Override the OpenAPI URL.
    pub fn with_open_api_url(mut self, url: impl Into<String>) -> Self {
        self.open_api_url = url.into();
        self
    }
}

/// Immutable mapping from route id to [`RouteEntry`].
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build a table directly from resolved entries. Later entries win.
    pub fn new(entries: impl IntoIterator<Item = RouteEntry>) -> Self {
        let routes = entries
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect();
        Self { routes }
    }

    /// Merge a route document with environment overrides.
    pub fn build(document: &RouteDocument, overrides: &[RouteOverride]) -> Result<Self, ConfigError> {
        let mut routes = BTreeMap::new();

        for (key, spec) in &document.routes {
            let target = match &spec.target {
                None => return Err(ConfigError::MissingTarget(key.clone())),
                Some(TargetSpec::Url(raw)) => resolve(key, raw)?,
                Some(TargetSpec::Resolved(target)) => {
                    target.validate().map_err(|e| ConfigError::InvalidTarget {
                        route: key.clone(),
                        target: target.to_string(),
                        reason: e.to_string(),
                    })?;
                    target.clone()
                }
            };

            let mut entry = RouteEntry::new(key.as_str(), target, spec.require);
            if let Some(url) = &spec.open_api {
                entry = entry.with_open_api_url(url.as_str());
            }
            if entry.id != *key {
                tracing::warn!(route = %key, id = %entry.id, "Route id lowercased");
            }
            routes.insert(entry.id.clone(), entry);
        }

        for route in overrides {
            let target = resolve(&route.id, &route.target)?;
            let require = route.restriction.map(|r| r.requirements()).unwrap_or_default();
            let mut entry = RouteEntry::new(route.id.as_str(), target, require);
            if let Some(url) = &route.open_api {
                entry = entry.with_open_api_url(url.as_str());
            }
            if routes.insert(entry.id.clone(), entry).is_some() {
                tracing::info!(route = %route.id, "Environment route overrides route document");
            }
        }

        Ok(Self { routes })
    }

    /// Look up a route by its lowercase id.
    pub fn get(&self, id: &str) -> Option<&RouteEntry> {
        self.routes.get(id)
    }

    /// Route ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// All entries in id order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn resolve(route: &str, raw: &str) -> Result<Target, ConfigError> {
    Target::parse(raw).map_err(|e| ConfigError::InvalidTarget {
        route: route.to_string(),
        target: raw.to_string(),
        reason: e.to_string(),
    })
}
