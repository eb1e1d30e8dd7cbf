//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate settings and the route document
//! - Build the route table, applying environment overrides
//! - Start the OpenAPI aggregator when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound before background tasks start

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::{loader, Environment, GatewayConfig, RouteDocument};
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::load_tls_config;
use crate::observability::metrics;
use crate::openapi::{AggregatedDoc, DocSnapshot, OpenApiAggregator};
use crate::routing::RouteTable;

/// Title of the aggregated OpenAPI document.
pub const DOCUMENT_TITLE: &str = "Simple Gateway";

/// A fully configured gateway, ready to serve.
pub struct Gateway {
    config: GatewayConfig,
    routes: Arc<RouteTable>,
    snapshot: Arc<DocSnapshot>,
}

impl Gateway {
    /// Load settings (optional TOML file, then environment) and the route
    /// document they point at.
    pub fn load(config_path: Option<&Path>, env: &Environment) -> Result<Self, GatewayError> {
        Self::from_config(loader::load(config_path, env)?, env)
    }

    /// Build the route table for already loaded settings.
    pub fn from_config(config: GatewayConfig, env: &Environment) -> Result<Self, GatewayError> {
        let document = RouteDocument::load(Path::new(&config.routes.file))?;
        let routes = RouteTable::build(&document, &env.route_overrides())?;

        tracing::info!(
            routes_file = %config.routes.file,
            routes = routes.len(),
            "Route table built"
        );

        Ok(Self::new(config, routes))
    }

    pub fn new(config: GatewayConfig, routes: RouteTable) -> Self {
        Self {
            config,
            routes: Arc::new(routes),
            snapshot: Arc::new(DocSnapshot::new()),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn snapshot(&self) -> Arc<DocSnapshot> {
        self.snapshot.clone()
    }

    pub fn http_server(&self) -> Result<HttpServer, GatewayError> {
        HttpServer::new(self.routes.clone(), self.snapshot.clone(), self.config.cors.clone())
    }

    /// The aggregator for this gateway, or `None` when merging is disabled.
    pub fn aggregator(&self) -> Result<Option<OpenApiAggregator>, GatewayError> {
        if !self.config.open_api.enabled {
            return Ok(None);
        }

        let aggregator = OpenApiAggregator::new(
            &self.routes,
            AggregatedDoc::new(DOCUMENT_TITLE, crate::GATEWAY_VERSION),
            self.snapshot.clone(),
            Duration::from_millis(self.config.open_api.interval_ms),
        )?;
        Ok(Some(aggregator))
    }

    /// Serve until `shutdown` is triggered.
    pub async fn run(self, shutdown: Shutdown) -> Result<(), GatewayError> {
        if let Some(address) = &self.config.observability.metrics_address {
            match address.parse::<SocketAddr>() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(e) => tracing::error!(metrics_address = %address, error = %e, "Failed to parse metrics address"),
            }
        }
        if !self.config.auth.cookie_name.is_empty() {
            tracing::info!(cookie_name = %self.config.auth.cookie_name, "Cookie gates check for presence of the Cookie header only");
        }

        let server = self.http_server()?;
        let bind_address = self.config.listener.bind_address();

        match &self.config.listener.tls {
            Some(tls) => {
                let tls = load_tls_config(tls).await.map_err(GatewayError::Tls)?;
                let addr = resolve(&bind_address).await?;
                let aggregator = self.spawn_aggregator(&shutdown)?;
                server.run_tls(addr, tls, shutdown.subscribe()).await?;
                join(aggregator).await;
            }
            None => {
                let listener = TcpListener::bind(&bind_address).await?;
                let aggregator = self.spawn_aggregator(&shutdown)?;
                server.run(listener, shutdown.subscribe()).await?;
                join(aggregator).await;
            }
        }

        Ok(())
    }

    fn spawn_aggregator(&self, shutdown: &Shutdown) -> Result<Option<tokio::task::JoinHandle<()>>, GatewayError> {
        Ok(self
            .aggregator()?
            .map(|aggregator| tokio::spawn(aggregator.run(shutdown.subscribe()))))
    }
}

async fn resolve(address: &str) -> Result<SocketAddr, GatewayError> {
    let mut addrs = tokio::net::lookup_host(address).await.map_err(|source| GatewayError::BindAddress {
        address: address.to_string(),
        source,
    })?;
    addrs.next().ok_or_else(|| GatewayError::BindAddress {
        address: address.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved"),
    })
}

async fn join(task: Option<tokio::task::JoinHandle<()>>) {
    if let Some(task) = task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "OpenAPI aggregator task failed");
        }
    }
}
