//! Memoization of call-chain traversals.
//!
//! Provides an append-only cache keyed by `(frame, direction)`. The fact
//! store never changes after construction, so entries never go stale and
//! nothing is evicted. The cache is owned by one evaluator and is not
//! shared across sessions.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::trace;

use crate::record::FrameId;
use crate::traverser::Direction;

/// Append-only memo of call-chain results.
///
/// Uses interior mutability so that lookups can record entries through a
/// shared reference.
///
/// # Example
///
/// ```rust
/// use trace_query_engine::{Direction, TraversalCache};
///
/// let cache = TraversalCache::new();
/// let chain = cache.get_or_insert_with(1, Direction::Callees, || vec![2, 3]);
/// assert_eq!(chain, vec![2, 3]);
///
/// // Served from the memo; the closure is not called
/// let again = cache.get_or_insert_with(1, Direction::Callees, || unreachable!());
/// assert_eq!(again, vec![2, 3]);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct TraversalCache {
    entries: RefCell<HashMap<(FrameId, Direction), Vec<FrameId>>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl TraversalCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized chain, if present, and counts the lookup.
    pub fn get(&self, frame: FrameId, direction: Direction) -> Option<Vec<FrameId>> {
        let found = self.entries.borrow().get(&(frame, direction)).cloned();
        match found {
            Some(chain) => {
                self.hits.set(self.hits.get() + 1);
                trace!(frame, %direction, len = chain.len(), "traversal cache hit");
                Some(chain)
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Records a chain. An existing entry for the key is kept.
    pub fn insert(&self, frame: FrameId, direction: Direction, chain: Vec<FrameId>) {
        self.entries
            .borrow_mut()
            .entry((frame, direction))
            .or_insert(chain);
    }

    /// Returns the memoized chain or computes, records and returns it.
    pub fn get_or_insert_with<F>(
        &self,
        frame: FrameId,
        direction: Direction,
        compute: F,
    ) -> Vec<FrameId>
    where
        F: FnOnce() -> Vec<FrameId>,
    {
        if let Some(chain) = self.get(frame, direction) {
            return chain;
        }
        let chain = compute();
        self.insert(frame, direction, chain.clone());
        chain
    }

    /// Returns true if a chain is recorded for the key (not counted).
    pub fn contains(&self, frame: FrameId, direction: Direction) -> bool {
        self.entries.borrow().contains_key(&(frame, direction))
    }

    /// Number of recorded chains.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.len(),
        }
    }
}

/// Counters describing cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the memo.
    pub hits: usize,
    /// Lookups that had to traverse.
    pub misses: usize,
    /// Number of recorded chains.
    pub entries: usize,
}
