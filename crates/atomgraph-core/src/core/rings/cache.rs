use super::query::{RingMode, RingQuery};
use super::ring::RingSet;
use std::collections::HashMap;
use std::sync::Arc;

/// Perceived ring sets keyed by the query that produced them.
///
/// Entries are shared out as `Arc`s so callers keep a consistent view even after
/// the cache is cleared by a topology edit.
#[derive(Debug, Default, Clone)]
pub(crate) struct RingCache {
    data: HashMap<(RingMode, RingQuery), Arc<RingSet>>,
}

impl RingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mode: RingMode, query: &RingQuery) -> Option<Arc<RingSet>> {
        // Owned key lookup; ring queries are small.
        self.data.get(&(mode, query.clone())).cloned()
    }

    /// Stores `rings` unless an entry for the key already exists, and returns the
    /// stored set. The first set inserted for a key is the one every caller sees.
    pub fn insert(&mut self, mode: RingMode, query: RingQuery, rings: RingSet) -> Arc<RingSet> {
        Arc::clone(
            self.data
                .entry((mode, query))
                .or_insert_with(|| Arc::new(rings)),
        )
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
