//! Per-query result cache with ignore overrides.
//!
//! Owned by [`Memory`](crate::Memory); all writes flow through
//! save/search/modify, never through external callers.

use crate::types::SearchResult;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Memoized search results keyed by the literal query string, plus a
/// per-query set of document ids excluded from that query's results.
///
/// Both maps sit behind one lock so a concurrent get and put on the same
/// query never observe a half-applied update; entries are only ever replaced
/// as whole lists. Ignore entries accumulate for the process lifetime.
pub(crate) struct ResultCache<M> {
    inner: RwLock<Inner<M>>,
}

struct Inner<M> {
    results: HashMap<String, Vec<SearchResult<M>>>,
    ignored: HashMap<String, HashSet<String>>,
}

impl<M: Clone> ResultCache<M> {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                results: HashMap::new(),
                ignored: HashMap::new(),
            }),
        }
    }

    /// Replaces the entry for `query` wholesale.
    pub(crate) fn put(&self, query: &str, results: Vec<SearchResult<M>>) {
        let mut inner = self.inner.write().unwrap();
        inner.results.insert(query.to_string(), results);
    }

    /// Returns the cached entry for `query`, filtered through its ignore-set.
    /// `None` means the query has never been cached.
    pub(crate) fn get(&self, query: &str) -> Option<Vec<SearchResult<M>>> {
        let inner = self.inner.read().unwrap();
        let results = inner.results.get(query)?;

        match inner.ignored.get(query) {
            None => Some(results.clone()),
            Some(ignored) => Some(
                results
                    .iter()
                    .filter(|r| !ignored.contains(&r.document.id))
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Permanently excludes `id` from `query`'s results.
    pub(crate) fn ignore(&self, query: &str, id: &str) {
        let mut inner = self.inner.write().unwrap();
        inner
            .ignored
            .entry(query.to_string())
            .or_default()
            .insert(id.to_string());
    }

    pub(crate) fn is_ignored(&self, query: &str, id: &str) -> bool {
        let inner = self.inner.read().unwrap();
        inner
            .ignored
            .get(query)
            .is_some_and(|ignored| ignored.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    fn result(id: &str, score: f64) -> SearchResult {
        SearchResult {
            score,
            document: Document::new(id, format!("text {id}"), ()),
        }
    }

    #[test]
    fn test_get_miss_returns_none() {
        let cache: ResultCache<()> = ResultCache::new();
        assert!(cache.get("unknown").is_none());
    }

    #[test]
    fn test_put_then_get() {
        let cache = ResultCache::new();
        cache.put("foo", vec![result("1", 1.2)]);

        let cached = cache.get("foo").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].document.id, "1");
        assert_eq!(cached[0].score, 1.2);
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let cache = ResultCache::new();
        cache.put("foo", vec![result("1", 0.9), result("2", 0.8)]);
        cache.put("foo", vec![result("3", 0.7)]);

        let cached = cache.get("foo").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].document.id, "3");
    }

    #[test]
    fn test_ignore_filters_get() {
        let cache = ResultCache::new();
        cache.put("foo", vec![result("1", 0.9), result("2", 0.8)]);
        cache.ignore("foo", "1");

        let cached = cache.get("foo").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].document.id, "2");
        assert!(cache.is_ignored("foo", "1"));
        assert!(!cache.is_ignored("foo", "2"));
    }

    #[test]
    fn test_ignore_is_scoped_to_query() {
        let cache = ResultCache::new();
        cache.put("foo", vec![result("1", 0.9)]);
        cache.put("bar", vec![result("1", 0.9)]);
        cache.ignore("foo", "1");

        assert!(cache.get("foo").unwrap().is_empty());
        assert_eq!(cache.get("bar").unwrap().len(), 1);
    }

    #[test]
    fn test_ignore_survives_put() {
        let cache = ResultCache::new();
        cache.ignore("foo", "1");
        cache.put("foo", vec![result("1", 0.9), result("2", 0.8)]);

        let cached = cache.get("foo").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].document.id, "2");
    }
}
