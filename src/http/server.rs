//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router around the dispatcher
//! - Hold the shared, read-only request state
//! - Serve plain HTTP or HTTPS until shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::error::GatewayError;
use crate::http::{handler, proxy};
use crate::lifecycle::shutdown;
use crate::openapi::DocSnapshot;
use crate::routing::RouteTable;

/// Built-in endpoints, listed after the route ids on `GET /`.
const BUILTIN_IDS: [&str; 2] = ["open-api", "alive"];

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub snapshot: Arc<DocSnapshot>,
    pub client: reqwest::Client,
    pub cors: Arc<CorsConfig>,
    /// Pre-rendered body of `GET /`.
    pub overview: Arc<String>,
}

#[derive(Serialize)]
struct Overview<'a> {
    gateway: &'a str,
    version: &'a str,
    routes: Vec<&'a str>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(
        routes: Arc<RouteTable>,
        snapshot: Arc<DocSnapshot>,
        cors: CorsConfig,
    ) -> Result<Self, GatewayError> {
        let overview = render_overview(&routes)?;
        let state = AppState {
            routes,
            snapshot,
            client: proxy::upstream_client()?,
            cors: Arc::new(cors),
            overview: Arc::new(overview),
        };

        Ok(Self { router: Self::build_router(state) })
    }

    /// Every path and method goes to the dispatcher.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(handler::dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP on `listener` until shutdown is signalled.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until shutdown is signalled.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = Handle::new();
        tokio::spawn({
            let handle = handle.clone();
            async move {
                shutdown::wait(shutdown).await;
                handle.graceful_shutdown(None);
            }
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Body of `GET /`: gateway identity and every reachable first segment.
pub fn render_overview(routes: &RouteTable) -> Result<String, serde_json::Error> {
    let mut ids: Vec<&str> = routes.ids().collect();
    for builtin in BUILTIN_IDS {
        if !ids.contains(&builtin) {
            ids.push(builtin);
        }
    }

    serde_json::to_string(&Overview {
        gateway: crate::GATEWAY_NAME,
        version: crate::GATEWAY_VERSION,
        routes: ids,
    })
}
