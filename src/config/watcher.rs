//! Snapshot file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::config::loader::load_snapshot;
use crate::observability::metrics;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Monitors the snapshot file and emits a freshly loaded snapshot on change.
pub struct SnapshotWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<Snapshot>,
}

impl SnapshotWatcher {
    /// Create a new SnapshotWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded snapshots.
    pub fn new(path: &Path, poll_interval: Duration) -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    ///
    /// The parent directory is watched so that editors replacing the file by
    /// rename are still noticed.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_file {
                        return;
                    }

                    tracing::info!(
                        path = %path.display(),
                        "Snapshot file change detected, reloading..."
                    );
                    match load_snapshot(&path) {
                        Ok(snapshot) => {
                            metrics::record_snapshot_reload(true);
                            let _ = tx.send(snapshot);
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
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Snapshot watcher started");
        Ok(watcher)
    }
}

/// Publish reloaded snapshots into the store until shutdown.
///
/// Overrides set at runtime stay in effect across reloads.
pub async fn publish_updates(
    mut updates: mpsc::UnboundedReceiver<Snapshot>,
    store: Arc<SnapshotStore>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Some(snapshot) => {
                        store.reload(snapshot);
                        tracing::info!("Snapshot published");
                    }
                    None => break,
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Snapshot publisher received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
