//! Decision resolution.
//!
//! # Precedence
//! ```text
//! tab override   → disabled: Direct | profile: Profile(id)
//! group override → disabled: Direct | profile: Profile(id)
//! first rule     → Profile(rule.profileId)
//! default        → Direct
//! ```
//!
//! Each step short-circuits. Evaluation keeps no state between calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::routing::matcher::RuleMatcher;
use crate::routing::pattern::PatternCache;
use crate::snapshot::{Override, Snapshot};

/// The routing outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Decision {
    Direct,
    Profile {
        #[serde(rename = "profileId")]
        profile_id: String,
    },
}

impl Decision {
    pub fn profile(profile_id: impl Into<String>) -> Self {
        Decision::Profile {
            profile_id: profile_id.into(),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Decision::Direct)
    }

    pub fn profile_id(&self) -> Option<&str> {
        match self {
            Decision::Direct => None,
            Decision::Profile { profile_id } => Some(profile_id),
        }
    }

    fn from_override(value: &Override) -> Self {
        match value {
            Override::Disabled => Decision::Direct,
            Override::Profile { profile_id } => Decision::profile(profile_id.clone()),
        }
    }
}

/// Which precedence layer produced a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecisionSource {
    TabOverride,
    GroupOverride,
    Rule {
        #[serde(rename = "ruleId")]
        rule_id: String,
    },
    Default,
}

impl DecisionSource {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DecisionSource::TabOverride => "tab_override",
            DecisionSource::GroupOverride => "group_override",
            DecisionSource::Rule { .. } => "rule",
            DecisionSource::Default => "default",
        }
    }
}

/// A decision together with the layer that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub source: DecisionSource,
}

/// Per-request inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Negative when the request does not belong to a real tab.
    pub tab_id: i64,
    /// `None` or negative when the tab is not grouped.
    pub group_id: Option<i64>,
    pub url: String,
}

impl RequestContext {
    pub fn new(tab_id: i64, group_id: Option<i64>, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            group_id,
            url: url.into(),
        }
    }
}

/// Resolves requests against a snapshot.
///
/// Owns the pattern cache; clone or wrap in `Arc` to share it.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    matcher: RuleMatcher,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine around an existing pattern cache.
    pub fn with_patterns(patterns: Arc<PatternCache>) -> Self {
        Self {
            matcher: RuleMatcher::new(patterns),
        }
    }

    pub fn patterns(&self) -> &Arc<PatternCache> {
        self.matcher.patterns()
    }

    /// Decide how to route a request. Always returns a decision.
    pub fn evaluate(
        &self,
        snapshot: &Snapshot,
        tab_id: i64,
        group_id: Option<i64>,
        url: &str,
    ) -> Decision {
        self.explain(snapshot, tab_id, group_id, url).decision
    }

    /// Like [`evaluate`](Self::evaluate), reporting the deciding layer.
    pub fn explain(
        &self,
        snapshot: &Snapshot,
        tab_id: i64,
        group_id: Option<i64>,
        url: &str,
    ) -> Evaluation {
        if tab_id >= 0 {
            if let Some(value) = snapshot.tab_override(tab_id) {
                return Evaluation {
                    decision: Decision::from_override(value),
                    source: DecisionSource::TabOverride,
                };
            }
        }

        if let Some(group_id) = group_id.filter(|id| *id >= 0) {
            if let Some(value) = snapshot.group_override(group_id) {
                return Evaluation {
                    decision: Decision::from_override(value),
                    source: DecisionSource::GroupOverride,
                };
            }
        }

        if let Some(rule) = self.matcher.find_matching_rule(&snapshot.rules, url) {
            return Evaluation {
                decision: Decision::profile(rule.profile_id.clone()),
                source: DecisionSource::Rule {
                    rule_id: rule.id.clone(),
                },
            };
        }

        Evaluation {
            decision: Decision::Direct,
            source: DecisionSource::Default,
        }
    }

    /// Evaluate a [`RequestContext`].
    pub fn evaluate_request(&self, snapshot: &Snapshot, request: &RequestContext) -> Evaluation {
        self.explain(snapshot, request.tab_id, request.group_id, &request.url)
    }
}
