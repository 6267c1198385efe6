//! Per-tab, per-group and per-URL proxy selection.
//!
//! The core is a pure decision engine: given a configuration [`Snapshot`]
//! and a request (tab id, group id, URL) it returns exactly one
//! [`Decision`]: connect directly, or use a named proxy profile.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod snapshot;

pub use config::ServiceConfig;
pub use routing::{Decision, DecisionEngine, ProxyInfo, ProxyRouter, RequestContext};
pub use snapshot::{Snapshot, SnapshotStore};
