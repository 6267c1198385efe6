//! Rule matching logic.
//!
//! # Responsibilities
//! - Parse the destination URL once per lookup
//! - Scan rules in stored order, skipping disabled ones
//! - Return the first rule whose pattern matches
//!
//! # Design Decisions
//! - First match wins; later rules are never consulted
//! - An unparsable URL matches no rule
//! - Patterns are compiled lazily through the shared `PatternCache`

use std::sync::Arc;

use crate::routing::pattern::{PatternCache, UrlTarget};
use crate::snapshot::Rule;

/// Finds the first enabled rule matching a URL.
#[derive(Debug, Clone, Default)]
pub struct RuleMatcher {
    patterns: Arc<PatternCache>,
}

impl RuleMatcher {
    pub fn new(patterns: Arc<PatternCache>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &Arc<PatternCache> {
        &self.patterns
    }

    /// Return the first enabled rule matching `url`, if any.
    pub fn find_matching_rule<'a>(&self, rules: &'a [Rule], url: &str) -> Option<&'a Rule> {
        let target = UrlTarget::parse(url)?;
        self.find_for_target(rules, &target)
    }

    /// Same as [`find_matching_rule`](Self::find_matching_rule) for an
    /// already parsed URL.
    pub fn find_for_target<'a>(&self, rules: &'a [Rule], target: &UrlTarget) -> Option<&'a Rule> {
        rules
            .iter()
            .filter(|rule| rule.enabled)
            .find(|rule| self.patterns.matches(&rule.pattern, target))
    }
}
