//! Rule pattern compilation and caching.
//!
//! # Dialects
//! - `re:<regex>`: case-insensitive regex, tested against the full URL
//! - anything else: wildcard (`*` = any run, `?` = one char), anchored,
//!   case-insensitive; tested against the full URL when the pattern contains
//!   `/` or `://`, otherwise against the hostname only
//!
//! # Design Decisions
//! - Cache key is the trimmed source text; entries are never evicted
//! - Compile failures are cached too, so a broken pattern is reported once
//! - A broken pattern never matches

use std::sync::Arc;

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::observability::metrics;

/// Prefix selecting the regex dialect.
pub const REGEX_PREFIX: &str = "re:";

/// What part of the request URL a wildcard is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    Hostname,
    FullUrl,
}

/// A compiled rule pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard { regex: Regex, target: MatchTarget },
    Regex(Regex),
}

/// A pattern that could not be compiled.
#[derive(Debug, Clone, Error)]
#[error("invalid pattern {pattern:?}: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

/// The parts of a parsed URL patterns are tested against.
#[derive(Debug, Clone)]
pub struct UrlTarget {
    href: String,
    /// `href` without the trailing `/` when the path is the bare root.
    bare_href: Option<String>,
    hostname: String,
}

impl UrlTarget {
    /// Parse a request URL, or `None` when it is not a URL.
    pub fn parse(url: &str) -> Option<Self> {
        let parsed = url::Url::parse(url.trim()).ok()?;
        let href = parsed.as_str().to_string();
        let bare_root =
            parsed.path() == "/" && parsed.query().is_none() && parsed.fragment().is_none();
        let bare_href = bare_root.then(|| href.trim_end_matches('/').to_string());

        Some(Self {
            hostname: parsed.host_str().unwrap_or_default().to_string(),
            href,
            bare_href,
        })
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    fn full_url_matches(&self, regex: &Regex) -> bool {
        regex.is_match(&self.href)
            || self.bare_href.as_deref().is_some_and(|bare| regex.is_match(bare))
    }
}

impl Pattern {
    /// Compile a pattern source. Surrounding whitespace is ignored.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let source = source.trim();
        if let Some(raw) = source.strip_prefix(REGEX_PREFIX) {
            return build_regex(source, raw).map(Pattern::Regex);
        }

        let target = if source.contains("://") || source.contains('/') {
            MatchTarget::FullUrl
        } else {
            MatchTarget::Hostname
        };
        let regex = build_regex(source, &wildcard_to_regex(source))?;
        Ok(Pattern::Wildcard { regex, target })
    }

    pub fn matches(&self, url: &UrlTarget) -> bool {
        match self {
            Pattern::Regex(regex) => url.full_url_matches(regex),
            Pattern::Wildcard {
                regex,
                target: MatchTarget::FullUrl,
            } => url.full_url_matches(regex),
            Pattern::Wildcard {
                regex,
                target: MatchTarget::Hostname,
            } => regex.is_match(url.hostname()),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }
}

fn build_regex(source: &str, expr: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(expr)
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError {
            pattern: source.to_string(),
            reason: e.to_string(),
        })
}

/// Escape everything except `*` and `?`, then anchor.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
    }
    expr.push('$');
    expr
}

type CacheEntry = Result<Arc<Pattern>, PatternError>;

/// Process-wide cache of compiled patterns, keyed by trimmed source text.
///
/// Safe to share between threads. Two callers racing on a new pattern may
/// both compile it; the cache keeps one entry.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: DashMap<String, CacheEntry>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or compile the pattern. Empty sources yield `None`.
    pub fn compile(&self, source: &str) -> Option<Arc<Pattern>> {
        let key = source.trim();
        if key.is_empty() {
            return None;
        }

        if let Some(entry) = self.entries.get(key) {
            return entry.value().as_ref().ok().cloned();
        }

        let compiled = Pattern::compile(key).map(Arc::new);
        if let Err(e) = &compiled {
            tracing::warn!(
                pattern = %key,
                error = %e.reason,
                "Rule pattern does not compile; it will never match"
            );
            metrics::record_pattern_compile_failure();
        }

        let entry = self.entries.entry(key.to_string()).or_insert(compiled);
        let result = entry.value().as_ref().ok().cloned();
        drop(entry);

        metrics::record_pattern_cache_size(self.entries.len());
        result
    }

    /// Test `source` against a parsed URL. Broken or empty patterns never match.
    pub fn matches(&self, source: &str, url: &UrlTarget) -> bool {
        self.compile(source).is_some_and(|pattern| pattern.matches(url))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
