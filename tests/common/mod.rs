//! Shared fixtures for integration tests.

use std::sync::Arc;

use proxy_selector::routing::{DecisionEngine, ProxyRouter};
use proxy_selector::snapshot::{Override, Profile, Rule, Scheme, Snapshot, SnapshotStore};

pub const TAB: i64 = 11;
pub const GROUP: i64 = 4;
pub const URL: &str = "https://app.example.com/dashboard";

/// Snapshot where every precedence layer applies to `TAB`, `GROUP` and `URL`.
pub fn layered_snapshot() -> Snapshot {
    Snapshot::new()
        .with_profile(Profile::new("tab-proxy", "Tab", Scheme::Http, "tab.proxy", 3128))
        .with_profile(Profile::new("group-proxy", "Group", Scheme::Socks5, "group.proxy", 1080))
        .with_profile(
            Profile::new("rule-proxy", "Rule", Scheme::Https, "rule.proxy", 8443)
                .with_credentials("user", "pass"),
        )
        .with_rule(Rule::new("r-rule", "*.example.com", "rule-proxy"))
        .with_tab_override(TAB, Override::profile("tab-proxy"))
        .with_group_override(GROUP, Override::profile("group-proxy"))
}

#[allow(dead_code)]
pub fn router_for(snapshot: Snapshot) -> (ProxyRouter, Arc<SnapshotStore>) {
    let store = Arc::new(SnapshotStore::new(snapshot));
    (ProxyRouter::new(DecisionEngine::new(), store.clone()), store)
}
