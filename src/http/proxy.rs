//! Streaming relay to an upstream target.
//!
//! The inbound body is handed to reqwest as a stream, so chunks go upstream as
//! they arrive. The upstream body is wrapped the same way for the client.
//! Nothing is buffered and nothing is retried.

use axum::{
    body::{Body, HttpBody},
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
};
use futures_util::TryStreamExt;

use crate::http::response;
use crate::routing::{matcher, RouteEntry};

/// Build the upstream client: HTTP/1.1, no proxy, redirects passed through.
pub fn upstream_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .no_proxy()
        .http1_only()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Forward `request` to the route's target and relay the answer.
///
/// Connection errors before the response head become an empty 500.
pub async fn forward(client: &reqwest::Client, route: &RouteEntry, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let path = matcher::rewrite(&route.target.path, parts.uri.path(), parts.uri.query());
    let url = format!("{}{}", route.target.origin(), path);

    let mut headers = parts.headers;
    match HeaderValue::from_str(&route.target.host) {
        Ok(host) => {
            headers.insert(header::HOST, host);
        }
        Err(e) => {
            tracing::error!(route = %route.id, host = %route.target.host, error = %e, "Target host is not a valid header value");
            return response::empty(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    tracing::debug!(route = %route.id, url = %url, "Forwarding request upstream");

    let mut upstream = client.request(parts.method, &url).headers(headers);
    if !body.is_end_stream() {
        let span = tracing::Span::current();
        let stream = body.into_data_stream().inspect_err(move |e| {
            let _enter = span.enter();
            tracing::warn!(error = %e, "Inbound body failed while relaying");
        });
        upstream = upstream.body(reqwest::Body::wrap_stream(stream));
    }

    let mut upstream_response = match upstream.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(route = %route.id, url = %url, error = %e, "Upstream request failed");
            return response::empty(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let status = upstream_response.status();
    let upstream_headers = std::mem::take(upstream_response.headers_mut());
    tracing::debug!(route = %route.id, status = status.as_u16(), "Upstream responded");

    let span = tracing::Span::current();
    let stream = upstream_response.bytes_stream().inspect_err(move |e| {
        let _enter = span.enter();
        tracing::error!(error = %e, "Upstream body failed after response head was sent");
    });

    let mut relayed = Response::new(Body::from_stream(stream));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = upstream_headers;
    relayed
}
