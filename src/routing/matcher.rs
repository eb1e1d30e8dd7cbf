//! Route id extraction and path rewriting.
//!
//! # Responsibilities
//! - Extract the route id (first path segment, lowercased)
//! - Rewrite the inbound path onto the target base path
//!
//! # Design Decisions
//! - Route ids match case-insensitively; the forwarded remainder keeps its case
//! - Rewriting is plain string work: no `..` resolution or segment normalization
//! - Query strings are carried over unchanged

/// Lowercased first segment of `path`, or `""` for the root.
pub fn route_id(path: &str) -> String {
    path.split('/').nth(1).unwrap_or_default().to_lowercase()
}

/// Everything after the first segment and its trailing slash.
///
/// `/billing/invoices/42` → `invoices/42`, `/billing` → ``.
pub fn remainder(path: &str) -> &str {
    let rest = path.strip_prefix('/').unwrap_or(path);
    match rest.find('/') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    }
}

/// Build the upstream path-and-query for an inbound request.
pub fn rewrite(target_path: &str, path: &str, query: Option<&str>) -> String {
    let base = target_path.trim_end_matches('/');
    let mut rewritten = format!("{}/{}", base, remainder(path));
    if let Some(query) = query {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    rewritten
}
