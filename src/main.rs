//! proxy-selector service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                  PROXY SELECTOR                  │
//!                  │                                                  │
//!  snapshot.json ──┼─▶ config::loader ─▶ SnapshotStore (ArcSwap)      │
//!   (watched)      │                         │                        │
//!                  │                         ▼                        │
//!  GET /decision ──┼─▶ http ─▶ ProxyRouter ─▶ DecisionEngine          │
//!                  │               │          tab → group → rules     │
//!                  │               ▼                                  │
//!  ◀── ProxyInfo ──┼── routing::profile (profile id → host/port)      │
//!                  │                                                  │
//!                  │  logging (tracing) · metrics (prometheus)        │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use proxy_selector::config::{load_config, ServiceConfig};
use proxy_selector::http::PreviewServer;
use proxy_selector::lifecycle::{bootstrap, signals, Shutdown};
use proxy_selector::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "proxy-selector")]
#[command(about = "Per-tab proxy decision service", long_about = None)]
struct Args {
    /// Path to the TOML service configuration.
    #[arg(short, long, env = "PROXY_SELECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file, overriding `snapshot.path` from the config.
    #[arg(short, long)]
    snapshot: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(snapshot) = args.snapshot {
        config.snapshot.path = snapshot;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("proxy-selector v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        snapshot = %config.snapshot.path,
        watch = config.snapshot.watch,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let runtime = bootstrap(&config, &shutdown)?;

    let listener = PreviewServer::bind(&config.listener).await?;
    let server = PreviewServer::new(runtime.router.clone(), &config.listener);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_signal().await;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
