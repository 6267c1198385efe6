//! Configuration snapshot subsystem.
//!
//! # Data Flow
//! ```text
//! persisted JSON document
//!     → config::loader (deserialize)
//!     → model.rs (Snapshot: profiles, rules, overrides)
//!     → store.rs (ArcSwap publication)
//!     → routing engine reads Arc<Snapshot> per request
//!
//! On change:
//!     clone current snapshot → modify copy → publish
//! ```
//!
//! # Design Decisions
//! - Snapshots are copy-on-change, never mutated in place while shared
//! - The `"direct"` profile is built in and never stored
//! - Dangling profile references are legal; resolution falls back to direct

pub mod model;
pub mod store;
pub mod types;

pub use model::{Snapshot, SCHEMA_VERSION};
pub use store::SnapshotStore;
pub use types::{Override, Profile, Rule, Scheme, DIRECT_PROFILE_ID};
