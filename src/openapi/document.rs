//! The aggregated OpenAPI document.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Paths describing the gateway's own endpoints. Never overwritten by upstreams.
pub const BUILTIN_PATHS: [&str; 3] = ["/", "/open-api", "/alive"];

/// Working copy of the merged document, owned by the aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedDoc {
    openapi: &'static str,
    info: Info,
    paths: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    version: String,
    title: String,
    description: String,
}

impl AggregatedDoc {
    /// A document holding only the built-in paths.
    pub fn new(title: &str, version: &str) -> Self {
        let mut paths = Map::new();
        paths.insert(
            "/".to_string(),
            json!({
                "get": {
                    "description": "a short overview over the services",
                    "responses": {"200": {"description": "success", "schema": {"type": "object"}}}
                },
                "options": {"description": "cors response headers"}
            }),
        );
        paths.insert(
            "/open-api".to_string(),
            json!({
                "get": {
                    "description": "this document",
                    "responses": {"200": {"description": "success", "schema": {"type": "object"}}}
                },
                "options": {"description": "cors response headers"}
            }),
        );
        paths.insert(
            "/alive".to_string(),
            json!({
                "head": {
                    "description": "pull-based alive check",
                    "responses": {"204": {"description": "success"}}
                }
            }),
        );

        Self {
            openapi: "3.0.0",
            info: Info {
                version: version.to_string(),
                title: title.to_string(),
                description: "An overview of all routes routed by this gateway.".to_string(),
            },
            paths,
        }
    }

    /// Insert or replace an upstream path. Returns `false` for built-in paths.
    pub fn insert_path(&mut self, key: String, operations: Value) -> bool {
        if BUILTIN_PATHS.contains(&key.as_str()) {
            return false;
        }
        self.paths.insert(key, operations);
        true
    }

    pub fn path(&self, key: &str) -> Option<&Value> {
        self.paths.get(key)
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Serialize with sorted keys, so equal documents give equal bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_builtin_paths() {
        let doc = AggregatedDoc::new("Simple Gateway", "1.2.3");
        assert_eq!(doc.path_count(), 3);
        for path in BUILTIN_PATHS {
            assert!(doc.path(path).is_some(), "missing {path}");
        }

        let value: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["openapi"], "3.0.0");
        assert_eq!(value["info"]["version"], "1.2.3");
        assert_eq!(value["info"]["title"], "Simple Gateway");
        assert!(value["paths"]["/alive"]["head"].is_object());
    }

    #[test]
    fn test_builtin_paths_are_protected() {
        let mut doc = AggregatedDoc::new("g", "0.0.0");
        assert!(!doc.insert_path("/alive".into(), json!({"get": {}})));
        assert!(doc.path("/alive").unwrap().get("head").is_some());

        assert!(doc.insert_path("/billing/invoices".into(), json!({"get": {}})));
        assert_eq!(doc.path_count(), 4);
    }

    #[test]
    fn test_serialization_is_order_independent() {
        let mut a = AggregatedDoc::new("g", "0.0.0");
        a.insert_path("/b/x".into(), json!({}));
        a.insert_path("/a/y".into(), json!({}));

        let mut b = AggregatedDoc::new("g", "0.0.0");
        b.insert_path("/a/y".into(), json!({}));
        b.insert_path("/b/x".into(), json!({}));

        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }
}
