//! Memoization of derived results per dataset version and filter selection.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::filter::FilterContext;

/// Cache of computed views keyed on `(dataset_version, FilterContext)`.
///
/// Entries are immutable once stored and shared through `Arc`. A miss always
/// recomputes, so dropping entries never changes results.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: HashMap<(u64, FilterContext), Arc<V>>,
    hits: u64,
    misses: u64,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> ResultCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dataset_version: u64, ctx: &FilterContext) -> Option<Arc<V>> {
        self.entries.get(&(dataset_version, ctx.clone())).cloned()
    }

    pub fn get_or_compute(
        &mut self,
        dataset_version: u64,
        ctx: &FilterContext,
        compute: impl FnOnce() -> V,
    ) -> Arc<V> {
        let key = (dataset_version, ctx.clone());
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(hit);
        }

        self.misses += 1;
        let value = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    /// Drops every entry computed against a dataset older than `dataset_version`.
    pub fn invalidate_before(&mut self, dataset_version: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(version, _), _| *version >= dataset_version);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(dataset_version, dropped, "Invalidated cached results");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
