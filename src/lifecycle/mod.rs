//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load snapshot → Build engine and store → Start watcher → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Server drains → Background tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload the snapshot file
//! ```
//!
//! # Design Decisions
//! - Fail fast: a startup error is fatal
//! - A missing snapshot path starts with an empty snapshot (everything direct)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Runtime, StartupError};
