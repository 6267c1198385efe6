//! Atomic publication of snapshots.
//!
//! # Sources of truth
//! - Profiles and rules come from the snapshot file only
//! - Overrides start from the file; overrides set or cleared at runtime are
//!   remembered and re-applied on every reload until the process exits

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;

use crate::snapshot::model::Snapshot;
use crate::snapshot::types::Override;

/// Override changes made at runtime. `None` records a cleared override.
#[derive(Debug, Default)]
struct RuntimeOverrides {
    tabs: HashMap<i64, Option<Override>>,
    groups: HashMap<i64, Option<Override>>,
}

impl RuntimeOverrides {
    fn apply(&self, mut snapshot: Snapshot) -> Snapshot {
        for (&tab_id, value) in &self.tabs {
            snapshot = match value {
                Some(o) => snapshot.with_tab_override(tab_id, o.clone()),
                None => snapshot.without_tab_override(tab_id),
            };
        }
        for (&group_id, value) in &self.groups {
            snapshot = match value {
                Some(o) => snapshot.with_group_override(group_id, o.clone()),
                None => snapshot.without_group_override(group_id),
            };
        }
        snapshot
    }
}

/// Holds the current snapshot and swaps it atomically on change.
///
/// Readers get an `Arc<Snapshot>` that stays valid and unchanged for as long
/// as they hold it, even if a newer snapshot is published meanwhile. Writers
/// are serialized so a reload never races an override change.
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    runtime: Mutex<RuntimeOverrides>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            runtime: Mutex::new(RuntimeOverrides::default()),
        }
    }

    /// The snapshot to evaluate against.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    fn writer(&self) -> MutexGuard<'_, RuntimeOverrides> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current snapshot and forget runtime overrides.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut runtime = self.writer();
        *runtime = RuntimeOverrides::default();
        self.current.store(Arc::new(snapshot));
    }

    /// Publish a freshly loaded snapshot, keeping runtime overrides on top.
    pub fn reload(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let runtime = self.writer();
        let next = Arc::new(runtime.apply(snapshot));
        self.current.store(next.clone());
        tracing::debug!(
            tab_overrides = runtime.tabs.len(),
            group_overrides = runtime.groups.len(),
            "Runtime overrides re-applied"
        );
        next
    }

    /// Set (`Some`) or clear (`None`) a tab override that survives reloads.
    pub fn set_tab_override(&self, tab_id: i64, value: Option<Override>) -> Arc<Snapshot> {
        let mut runtime = self.writer();
        runtime.tabs.insert(tab_id, value.clone());
        let current = Snapshot::clone(&self.current.load());
        let next = match value {
            Some(o) => current.with_tab_override(tab_id, o),
            None => current.without_tab_override(tab_id),
        };
        self.swap(next)
    }

    /// Set (`Some`) or clear (`None`) a group override that survives reloads.
    pub fn set_group_override(&self, group_id: i64, value: Option<Override>) -> Arc<Snapshot> {
        let mut runtime = self.writer();
        runtime.groups.insert(group_id, value.clone());
        let current = Snapshot::clone(&self.current.load());
        let next = match value {
            Some(o) => current.with_group_override(group_id, o),
            None => current.without_group_override(group_id),
        };
        self.swap(next)
    }

    /// Derive a new snapshot from the current one and publish it.
    ///
    /// The change is not remembered across reloads.
    pub fn update<F>(&self, f: F) -> Arc<Snapshot>
    where
        F: FnOnce(Snapshot) -> Snapshot,
    {
        let _writer = self.writer();
        let next = f(Snapshot::clone(&self.current.load()));
        self.swap(next)
    }

    /// Callers hold the writer lock.
    fn swap(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        self.current.store(next.clone());
        next
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").field("current", &self.current()).finish()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::types::Rule;

    #[test]
    fn test_publish_replaces_snapshot() {
        let store = SnapshotStore::default();
        let before = store.current();

        store.publish(Snapshot::new().with_tab_override(1, Override::Disabled));

        assert!(before.tab_override(1).is_none());
        assert_eq!(store.current().tab_override(1), Some(&Override::Disabled));
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(SnapshotStore::default());
        let handles: Vec<_> = (0..8)
            .map(|tab| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.set_tab_override(tab, Some(Override::Disabled));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.current().tab_overrides.len(), 8);
    }

    #[test]
    fn test_reload_keeps_runtime_overrides() {
        let store = SnapshotStore::default();
        store.set_tab_override(7, Some(Override::Disabled));
        store.set_group_override(3, Some(Override::profile("p1")));

        let file = Snapshot::new().with_rule(Rule::new("r1", "*.corp", "p1"));
        store.reload(file);

        let current = store.current();
        assert_eq!(current.rules.len(), 1);
        assert_eq!(current.tab_override(7), Some(&Override::Disabled));
        assert_eq!(current.group_override(3), Some(&Override::profile("p1")));
    }

    #[test]
    fn test_reload_keeps_runtime_clears() {
        let store = SnapshotStore::new(Snapshot::new().with_tab_override(4, Override::Disabled));
        store.set_tab_override(4, None);

        store.reload(
            Snapshot::new()
                .with_tab_override(4, Override::Disabled)
                .with_tab_override(5, Override::Disabled),
        );

        assert!(store.current().tab_override(4).is_none());
        assert_eq!(store.current().tab_override(5), Some(&Override::Disabled));
    }

    #[test]
    fn test_publish_forgets_runtime_overrides() {
        let store = SnapshotStore::default();
        store.set_tab_override(7, Some(Override::Disabled));

        store.publish(Snapshot::new());
        store.reload(Snapshot::new());

        assert!(store.current().tab_override(7).is_none());
    }
}
