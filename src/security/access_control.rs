//! Credential presence gates.
//!
//! Routes may require an `Authorization` header, a `Cookie` header and an
//! `X-API-KEY` header. Gates run in that order and the first failure wins:
//! a missing header is 401, a present but empty one is 403. Values are never
//! validated, only checked for presence.

use axum::http::{HeaderMap, StatusCode};

use crate::config::Requirements;

pub const AUTHORIZATION: &str = "authorization";
pub const COOKIE: &str = "cookie";
pub const X_API_KEY: &str = "x-api-key";

/// Why a request was stopped at a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("missing {0} header")]
    Missing(&'static str),

    #[error("empty {0} header")]
    Empty(&'static str),
}

impl Denial {
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::Missing(_) => StatusCode::UNAUTHORIZED,
            Denial::Empty(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Apply the route's requirement gates to the request headers.
pub fn check(require: &Requirements, headers: &HeaderMap) -> Result<(), Denial> {
    if require.authorization {
        require_header(headers, AUTHORIZATION)?;
    }
    if require.cookie {
        require_header(headers, COOKIE)?;
    }
    if require.api_key {
        require_header(headers, X_API_KEY)?;
    }
    Ok(())
}

fn require_header(headers: &HeaderMap, name: &'static str) -> Result<(), Denial> {
    match headers.get(name) {
        None => Err(Denial::Missing(name)),
        Some(value) if value.is_empty() => Err(Denial::Empty(name)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_no_requirements_pass() {
        assert_eq!(check(&Requirements::default(), &HeaderMap::new()), Ok(()));
    }

    #[test]
    fn test_authorization_gate() {
        let require = Requirements { authorization: true, ..Default::default() };

        let denial = check(&require, &HeaderMap::new()).unwrap_err();
        assert_eq!(denial, Denial::Missing(AUTHORIZATION));
        assert_eq!(denial.status(), StatusCode::UNAUTHORIZED);

        let denial = check(&require, &headers(&[("authorization", "")])).unwrap_err();
        assert_eq!(denial, Denial::Empty(AUTHORIZATION));
        assert_eq!(denial.status(), StatusCode::FORBIDDEN);

        assert_eq!(check(&require, &headers(&[("authorization", "Bearer x")])), Ok(()));
    }

    #[test]
    fn test_gates_run_in_order() {
        let require = Requirements { authorization: true, cookie: true, api_key: true };

        // Empty authorization stops before the missing cookie is noticed.
        let denial = check(&require, &headers(&[("authorization", "")])).unwrap_err();
        assert_eq!(denial, Denial::Empty(AUTHORIZATION));

        let denial = check(&require, &headers(&[("authorization", "a"), ("cookie", "")])).unwrap_err();
        assert_eq!(denial, Denial::Empty(COOKIE));

        let denial = check(&require, &headers(&[("authorization", "a"), ("cookie", "s=1")])).unwrap_err();
        assert_eq!(denial, Denial::Missing(X_API_KEY));

        let all = headers(&[("authorization", "a"), ("cookie", "s=1"), ("x-api-key", "k")]);
        assert_eq!(check(&require, &all), Ok(()));
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let require = Requirements { api_key: true, ..Default::default() };
        let mut map = HeaderMap::new();
        map.insert("X-API-KEY", HeaderValue::from_static("secret"));
        assert_eq!(check(&require, &map), Ok(()));
    }
}
