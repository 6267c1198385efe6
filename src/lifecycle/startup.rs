//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the initial snapshot
//! - Build the pattern cache, decision engine and snapshot store
//! - Start the snapshot watcher and SIGHUP reloader
//!
//! Must run inside a Tokio runtime because it spawns background tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;
use thiserror::Error;

use crate::config::loader::{load_snapshot, ConfigError};
use crate::config::schema::ServiceConfig;
use crate::config::watcher::{publish_updates, SnapshotWatcher};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::reload_on_hangup;
use crate::routing::{DecisionEngine, ProxyRouter};
use crate::snapshot::{Snapshot, SnapshotStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load initial snapshot: {0}")]
    Snapshot(#[from] ConfigError),

    #[error("failed to start snapshot watcher: {0}")]
    Watch(#[from] notify::Error),
}

/// Everything the service needs once started.
pub struct Runtime {
    pub router: ProxyRouter,
    /// Dropping the watcher stops file notifications.
    _watcher: Option<RecommendedWatcher>,
}

/// Load state and start background tasks.
pub fn bootstrap(config: &ServiceConfig, shutdown: &Shutdown) -> Result<Runtime, StartupError> {
    let source = &config.snapshot;
    let initial = if source.path.is_empty() {
        tracing::warn!("No snapshot path configured; every request will connect directly");
        Snapshot::default()
    } else {
        load_snapshot(&PathBuf::from(&source.path))?
    };

    let store = Arc::new(SnapshotStore::new(initial));
    let router = ProxyRouter::new(DecisionEngine::new(), store.clone());

    let mut watcher = None;
    if !source.path.is_empty() {
        let path = PathBuf::from(&source.path);

        if source.watch {
            let (snapshot_watcher, updates) =
                SnapshotWatcher::new(&path, Duration::from_secs(source.poll_interval_secs));
            watcher = Some(snapshot_watcher.run()?);
            tokio::spawn(publish_updates(updates, store.clone(), shutdown.subscribe()));
        }

        tokio::spawn(reload_on_hangup(path, store, shutdown.subscribe()));
    }

    Ok(Runtime {
        router,
        _watcher: watcher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Decision, RequestContext};
    use std::fs;

    #[tokio::test]
    async fn test_bootstrap_without_snapshot() {
        let shutdown = Shutdown::new();
        let runtime = bootstrap(&ServiceConfig::default(), &shutdown).unwrap();

        let outcome = runtime.router.route(&RequestContext::new(1, None, "https://example.com/"));
        assert_eq!(outcome.evaluation.decision, Decision::Direct);
    }

    #[tokio::test]
    async fn test_bootstrap_loads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"rules": [{"id": "r1", "pattern": "*.example.com", "profileId": "p1"}]}"#,
        )
        .unwrap();

        let mut config = ServiceConfig::default();
        config.snapshot.path = path.display().to_string();
        config.snapshot.watch = false;

        let shutdown = Shutdown::new();
        let runtime = bootstrap(&config, &shutdown).unwrap();
        let outcome = runtime.router.route(&RequestContext::new(1, None, "https://a.example.com/"));
        assert_eq!(outcome.evaluation.decision, Decision::profile("p1"));
        assert!(outcome.proxy.is_direct());
        shutdown.trigger();
    }

    #[tokio::test]
    async fn test_bootstrap_fails_on_broken_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let mut config = ServiceConfig::default();
        config.snapshot.path = path.display().to_string();

        let result = bootstrap(&config, &Shutdown::new());
        assert!(matches!(result, Err(StartupError::Snapshot(_))));
    }
}
