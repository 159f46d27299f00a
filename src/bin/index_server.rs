//! HTTP server for the capability index.
//!
//! Loads the catalog once at startup (a failed load exits before binding),
//! then serves read-only JSON views, the OpenAPI document, the service graph
//! and the validation report. With `--reload-interval` the catalog is re-read
//! periodically and swapped in atomically.

use anyhow::{Context, Result};
use capindex::server::{AppState, router, spawn_reload_loop};
use capindex::{CatalogStore, IndexRoot};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "index-server", version)]
#[command(about = "Serve the capability index over HTTP", long_about = None)]
struct Cli {
    /// Catalog root holding repos.yml and actions.yml
    #[arg(long, env = "INDEX_ROOT")]
    root: Option<PathBuf>,

    /// Port to listen on (defaults to [server].port)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Seconds between catalog reloads (defaults to [server].reload_interval_secs)
    #[arg(long, env = "INDEX_RELOAD_SECS")]
    reload_interval: Option<u64>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capindex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = IndexRoot::discover(cli.root.as_deref())?;
    let store = CatalogStore::open(root.source())
        .with_context(|| format!("failed to load catalog from {}", root.root.display()))?;
    let store = Arc::new(store);

    if let Some(catalog) = store.snapshot() {
        info!(
            root = %root.root.display(),
            repos = catalog.repos.len(),
            capabilities = catalog.capabilities.len(),
            actions = catalog.actions.len(),
            "catalog loaded"
        );
    }

    let reload_secs = cli
        .reload_interval
        .or(root.config.server.reload_interval_secs)
        .filter(|secs| *secs > 0);
    if let Some(secs) = reload_secs {
        spawn_reload_loop(Arc::clone(&store), Duration::from_secs(secs));
    }

    let port = cli.port.unwrap_or(root.config.server.port);
    let addr: SocketAddr = format!("{}:{port}", cli.host)
        .parse()
        .with_context(|| format!("invalid listen address {}:{port}", cli.host))?;
    let app = router(AppState::new(store, root.config.openapi.clone()));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("failed to install Ctrl+C handler: {err}");
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received, shutting down");
}
