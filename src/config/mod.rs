//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! snapshot file (JSON)
//!     → loader.rs (parse, log diagnostics)
//!     → SnapshotStore (atomic publish)
//!
//! On snapshot file change:
//!     watcher.rs detects change
//!     → loader.rs loads new snapshot
//!     → publish_updates swaps it into the store
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - A snapshot that fails to parse never replaces the current one

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_snapshot, parse_snapshot, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ServiceConfig, SnapshotSourceConfig};
pub use validation::{validate_config, validate_snapshot, ValidationError};
pub use watcher::SnapshotWatcher;
