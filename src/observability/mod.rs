//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / config / http produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric calls are no-ops until an exporter is installed, so the engine
//!   can be embedded without any observability setup
//! - Log level comes from `RUST_LOG` first, then the service config

pub mod logging;
pub mod metrics;
