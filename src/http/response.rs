//! Responses produced by the gateway itself.
//!
//! Proxied responses are built in `proxy.rs` from the upstream response; this
//! module only covers built-in endpoints, CORS preflights and rejections.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::config::CorsConfig;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const ALLOWED_REQUEST_HEADERS: &str = "Authorization, X-API-KEY";

/// A response with a status and no body.
pub fn empty(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

/// Preflight answer for the gateway's own endpoints.
pub fn gateway_preflight() -> Response {
    let mut response = empty(StatusCode::NO_CONTENT);
    allow_get_from_anywhere(&mut response);
    response
}

/// Preflight answer for routed paths, from the configured allow-list.
pub fn route_preflight(cors: &CorsConfig) -> Response {
    let mut response = empty(StatusCode::NO_CONTENT);
    let headers = response.headers_mut();

    match HeaderValue::from_str(&cors.methods.join(",")) {
        Ok(methods) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods);
        }
        Err(e) => tracing::warn!(error = %e, "CORS methods are not a valid header value"),
    }
    match HeaderValue::from_str(&cors.origin) {
        Ok(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(e) => tracing::warn!(error = %e, "CORS origin is not a valid header value"),
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_REQUEST_HEADERS),
    );

    response
}

/// 200 with a JSON body and GET-only CORS headers.
pub fn json(body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    allow_get_from_anywhere(&mut response);
    response
}

fn allow_get_from_anywhere(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}
