//! Compiled parameter pattern cache

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use regex::Regex;
use tracing::warn;

/// Default number of compiled patterns kept
pub const DEFAULT_PATTERN_CAPACITY: usize = 1024;

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Full-string pattern matcher with a bounded cache of compiled patterns
///
/// A pattern matches only when it covers the whole candidate, so `"4"` does
/// not match `"42"`. Patterns that fail to compile are cached as such and
/// never match.
pub struct PatternCache {
    compiled: DashMap<String, Option<Regex>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            compiled: DashMap::new(),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Whether `candidate` matches `pattern` in full
    pub fn is_match(&self, pattern: &str, candidate: &str) -> bool {
        if let Some(entry) = self.compiled.get(pattern) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().as_ref().is_some_and(|re| re.is_match(candidate));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = compile(pattern);
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(candidate));

        if self.compiled.len() >= self.capacity {
            self.evict();
        }
        self.compiled.insert(pattern.to_string(), compiled);
        matched
    }

    pub fn stats(&self) -> PatternCacheStats {
        PatternCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.compiled.len(),
            capacity: self.capacity,
        }
    }

    pub fn clear(&self) {
        self.compiled.clear();
    }

    /// Drop roughly a tenth of the entries (at least one)
    fn evict(&self) {
        let mut budget = (self.capacity / 10).max(1);
        self.compiled.retain(|_, _| {
            if budget > 0 {
                budget -= 1;
                false
            } else {
                true
            }
        });
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CAPACITY)
    }
}

/// Anchored form of `pattern`, or `None` when `pattern` is invalid on its own
///
/// An unbalanced pattern such as `x)|(.*` becomes valid once wrapped and
/// would escape the anchors, so the bare pattern is checked first.
fn compile(pattern: &str) -> Option<Regex> {
    if let Err(e) = Regex::new(pattern) {
        warn!(pattern, error = %e, "Invalid parameter pattern, treating as no match");
        return None;
    }

    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "Invalid parameter pattern, treating as no match");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_string_semantics() {
        let cache = PatternCache::default();

        assert!(cache.is_match("42", "42"));
        assert!(!cache.is_match("4", "42"));
        assert!(!cache.is_match("42", "142"));
        assert!(cache.is_match("4|42", "42"));
        assert!(cache.is_match("kerbal-.*", "kerbal-space-program"));
        assert!(!cache.is_match("kerbal", "kerbal-space-program"));
    }

    #[test]
    fn test_wildcard_matches_anything() {
        let cache = PatternCache::default();
        for candidate in ["", "42", "kerbal-space-program", "with spaces"] {
            assert!(cache.is_match(".*", candidate), "{candidate:?}");
        }
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let cache = PatternCache::default();
        assert!(!cache.is_match("(unclosed", "(unclosed"));
        assert!(!cache.is_match("(unclosed", ""));
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_unbalanced_pattern_cannot_escape_anchors() {
        let cache = PatternCache::default();
        assert!(Regex::new("x)|(.*").is_err());

        for candidate in ["anything-at-all", "x", "", "42"] {
            assert!(!cache.is_match("x)|(.*", candidate), "{candidate:?}");
        }
        assert!(!cache.is_match("1)|(2", "2"));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_hits_and_misses() {
        let cache = PatternCache::default();
        cache.is_match("[0-9]+", "1");
        cache.is_match("[0-9]+", "2");
        cache.is_match("[a-z]+", "x");

        let stats = cache.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 2);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = PatternCache::new(20);
        for i in 0..100 {
            assert!(cache.is_match(&i.to_string(), &i.to_string()));
        }
        assert!(cache.stats().entries <= 20);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
