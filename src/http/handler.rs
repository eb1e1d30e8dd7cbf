//! Request dispatch.
//!
//! Every inbound request passes through [`dispatch`], which answers the
//! gateway's own endpoints, CORS preflights and unknown routes itself and
//! relays everything else to the route's target.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
};
use tracing::Instrument;

use crate::http::{proxy, response, server::AppState};
use crate::observability::{metrics, CorrelationId};
use crate::routing::matcher;
use crate::security::access_control;

/// Label used in metrics for requests answered by the gateway itself.
const GATEWAY_ROUTE: &str = "gateway";

pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let correlation_id = CorrelationId::new();
    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    handle(state, request).instrument(span).await
}

async fn handle(state: AppState, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_lowercase();

    tracing::info!(method = %method, uri = %request.uri(), "Request received");

    if let Some(response) = builtin(&state, &method, &path) {
        return finish(response, &method, GATEWAY_ROUTE, started);
    }

    let id = matcher::route_id(&path);
    let Some(route) = state.routes.get(&id) else {
        tracing::info!(route = %id, "No route matched");
        return finish(response::empty(StatusCode::NOT_FOUND), &method, "none", started);
    };

    if let Err(denial) = access_control::check(&route.require, request.headers()) {
        tracing::info!(route = %route.id, reason = %denial, "Request rejected");
        return finish(response::empty(denial.status()), &method, &route.id, started);
    }

    let response = proxy::forward(&state.client, route, request).await;
    finish(response, &method, &route.id, started)
}

/// Answers that never reach an upstream.
fn builtin(state: &AppState, method: &Method, path: &str) -> Option<Response> {
    let root = path.is_empty() || path == "/";

    match *method {
        Method::HEAD if path == "/alive" => Some(response::empty(StatusCode::NO_CONTENT)),
        Method::OPTIONS if root || path == "/open-api" => Some(response::gateway_preflight()),
        Method::OPTIONS if !state.cors.methods.is_empty() => Some(response::route_preflight(&state.cors)),
        Method::GET if root => Some(response::json(state.overview.as_str().to_owned())),
        Method::GET if path == "/open-api" => Some(response::json(state.snapshot.load().as_str().to_owned())),
        _ => None,
    }
}

fn finish(response: Response, method: &Method, route: &str, started: Instant) -> Response {
    let status = response.status().as_u16();
    tracing::info!(status, elapsed_ms = started.elapsed().as_millis() as u64, "Request dispatched");
    metrics::record_request(method.as_str(), status, route, started);
    response
}
