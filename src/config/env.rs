//! Environment snapshot and typed route overrides.
//!
//! The process environment is captured once at startup. Setting names are
//! looked up exactly first and case-insensitively second, so `service_http_port`
//! and `SERVICE_HTTP_PORT` are equivalent.
//!
//! Route overrides follow three key patterns:
//! ```text
//! ROUTE_<ID>     = http(s)://host/path   (required, defines the route)
//! RESTRICT_<ID>  = API-KEY | COOKIE | AUTHORIZATION
//! OPEN_API_<ID>  = http(s)://host/open-api
//! ```

use crate::config::routes::Requirements;

const ROUTE_PREFIX: &str = "ROUTE_";

/// A captured set of environment variables.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<(String, String)>,
}

impl Environment {
    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        Self::from_pairs(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Build an environment from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        Self { vars }
    }

    /// Look up a variable, exact name first, then ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| self.vars.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a variable, falling back to `fallback` when unset.
    pub fn get_or(&self, key: &str, fallback: &str) -> String {
        self.get(key).unwrap_or(fallback).to_string()
    }

    /// Enumerate `ROUTE_<ID>` overrides in name order.
    pub fn route_overrides(&self) -> Vec<RouteOverride> {
        let mut overrides = Vec::new();

        for (key, value) in &self.vars {
            let Some(raw_id) = strip_prefix_ignore_case(key, ROUTE_PREFIX) else {
                continue;
            };
            if raw_id.is_empty() {
                continue;
            }
            if !is_http_url(value) {
                tracing::debug!(variable = %key, "Ignoring route override without http(s) URL");
                continue;
            }

            let raw_id = raw_id.to_lowercase();
            let restriction = self
                .get(&format!("RESTRICT_{raw_id}"))
                .and_then(|value| match value.parse::<Restriction>() {
                    Ok(restriction) => Some(restriction),
                    Err(e) => {
                        tracing::warn!(route = %raw_id, error = %e, "Ignoring route restriction");
                        None
                    }
                });
            let open_api = self
                .get(&format!("OPEN_API_{raw_id}"))
                .filter(|url| !url.is_empty())
                .map(str::to_string);

            overrides.push(RouteOverride {
                id: raw_id.replace('_', "-"),
                target: value.clone(),
                restriction,
                open_api,
            });
        }

        overrides
    }
}

/// A route defined through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverride {
    /// Lowercase route id, underscores replaced with hyphens.
    pub id: String,
    /// Upstream URL.
    pub target: String,
    /// Single active credential requirement.
    pub restriction: Option<Restriction>,
    /// Explicit OpenAPI document URL.
    pub open_api: Option<String>,
}

/// The one credential requirement an environment route may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    ApiKey,
    Cookie,
    Authorization,
}

impl Restriction {
    /// Requirement flags with only this restriction set.
    pub fn requirements(self) -> Requirements {
        Requirements {
            authorization: self == Restriction::Authorization,
            cookie: self == Restriction::Cookie,
            api_key: self == Restriction::ApiKey,
        }
    }
}

impl std::str::FromStr for Restriction {
    type Err = UnknownRestriction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "API-KEY" => Ok(Restriction::ApiKey),
            "COOKIE" => Ok(Restriction::Cookie),
            "AUTHORIZATION" => Ok(Restriction::Authorization),
            _ => Err(UnknownRestriction(s.to_string())),
        }
    }
}

/// A `RESTRICT_<ID>` value outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown restriction '{0}', expected API-KEY, COOKIE or AUTHORIZATION")]
pub struct UnknownRestriction(pub String);

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

fn is_http_url(value: &str) -> bool {
    strip_prefix_ignore_case(value, "http://").is_some()
        || strip_prefix_ignore_case(value, "https://").is_some()
}
