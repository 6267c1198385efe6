//! HTTP preview API subsystem.
//!
//! # Data Flow
//! ```text
//! GET /decision?tabId&groupId&url
//!     → handlers.rs (parse query)
//!     → routing::ProxyRouter (decision + connection parameters)
//!     → JSON response
//!
//! PUT/DELETE /overrides/{tab|group}/{id}
//!     → handlers.rs
//!     → SnapshotStore::update (copy-on-change publish)
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, PreviewServer, ServerError};
