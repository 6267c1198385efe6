//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT/SIGTERM and turn them into a shutdown
//! - Reload the snapshot file on SIGHUP (unix only)

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::loader::load_snapshot;
use crate::observability::metrics;
use crate::snapshot::SnapshotStore;

/// Resolve when the process is asked to stop.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}

/// Reload the snapshot from `path` every time SIGHUP arrives. Overrides set
/// at runtime are kept.
#[cfg(unix)]
pub async fn reload_on_hangup(
    path: PathBuf,
    store: Arc<SnapshotStore>,
    mut shutdown: broadcast::Receiver<()>,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for SIGHUP");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!(path = %path.display(), "SIGHUP received, reloading snapshot");
                match load_snapshot(&path) {
                    Ok(snapshot) => {
                        metrics::record_snapshot_reload(true);
                        store.reload(snapshot);
                    }
                    Err(e) => {
                        metrics::record_snapshot_reload(false);
                        tracing::error!(
                            "Failed to reload snapshot: {}. Keeping current snapshot.",
                            e
                        );
                    }
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

#[cfg(not(unix))]
pub async fn reload_on_hangup(
    _path: PathBuf,
    _store: Arc<SnapshotStore>,
    _shutdown: broadcast::Receiver<()>,
) {
}
