//! Simple API gateway binary.

use std::path::PathBuf;

use clap::Parser;

use simple_gateway::config::{loader, Environment};
use simple_gateway::lifecycle::signals;
use simple_gateway::observability::logging;
use simple_gateway::{Gateway, Shutdown, GATEWAY_NAME, GATEWAY_VERSION};

#[derive(Parser)]
#[command(name = "simple-gateway", version, about = "Route, gate and stream HTTP traffic to upstream services")]
struct Args {
    /// Optional TOML settings file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let dotenv = dotenvy::dotenv();

    let env = Environment::from_process();
    let config = loader::load(args.config.as_deref(), &env)?;
    logging::init_logging(&config.observability);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    // reqwest and axum-server may each pull in a different rustls backend.
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing::info!(
        gateway = GATEWAY_NAME,
        version = GATEWAY_VERSION,
        bind_address = %config.listener.bind_address(),
        tls = config.listener.tls.is_some(),
        open_api = config.open_api.enabled,
        "Configuration loaded"
    );

    let gateway = Gateway::from_config(config, &env)?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    gateway.run(shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
