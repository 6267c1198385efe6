//! Request routing against the live snapshot.
//!
//! # Responsibilities
//! - Read the current snapshot once per request
//! - Evaluate the decision and resolve connection parameters
//! - Record decision metrics and debug logs
//!
//! # Design Decisions
//! - One snapshot per request, so a concurrent publish never splits a lookup
//! - Never fails: the worst outcome is a direct connection

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::routing::decision::{DecisionEngine, Evaluation, RequestContext};
use crate::routing::profile::{resolve_decision, ProxyInfo};
use crate::snapshot::SnapshotStore;

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOutcome {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub proxy: ProxyInfo,
}

/// Entry point used by the request hook and preview surfaces.
#[derive(Debug, Clone)]
pub struct ProxyRouter {
    engine: DecisionEngine,
    store: Arc<SnapshotStore>,
}

impl ProxyRouter {
    pub fn new(engine: DecisionEngine, store: Arc<SnapshotStore>) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Route a request through the current snapshot.
    pub fn route(&self, request: &RequestContext) -> RouteOutcome {
        let snapshot = self.store.current();
        let evaluation = self.engine.evaluate_request(&snapshot, request);
        let proxy = resolve_decision(&snapshot, &evaluation.decision);

        tracing::debug!(
            tab_id = request.tab_id,
            group_id = ?request.group_id,
            url = %request.url,
            source = evaluation.source.label(),
            profile_id = evaluation.decision.profile_id().unwrap_or("direct"),
            proxy_type = proxy.proxy_type.as_str(),
            "Request routed"
        );
        metrics::record_decision(&evaluation, &proxy);

        RouteOutcome { evaluation, proxy }
    }
}
