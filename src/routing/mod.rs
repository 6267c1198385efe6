//! Routing subsystem: the proxy decision engine.
//!
//! # Data Flow
//! ```text
//! RequestContext (tab id, group id, url)
//!     → router.rs (read current snapshot)
//!     → decision.rs (tab override → group override → rules → direct)
//!     → matcher.rs (first enabled rule whose pattern matches)
//!     → pattern.rs (compile on demand, cached by source text)
//!     → profile.rs (profile id → ProxyInfo, direct on any miss)
//! ```
//!
//! # Design Decisions
//! - Deterministic: same snapshot and request always give the same decision
//! - First match wins (rule order is user-authored priority)
//! - No errors escape: malformed URLs and patterns simply do not match

pub mod decision;
pub mod matcher;
pub mod pattern;
pub mod profile;
pub mod router;

pub use decision::{Decision, DecisionEngine, DecisionSource, Evaluation, RequestContext};
pub use matcher::RuleMatcher;
pub use pattern::{Pattern, PatternCache};
pub use profile::{resolve_decision, resolve_profile, ProxyInfo, ProxyType};
pub use router::{ProxyRouter, RouteOutcome};
