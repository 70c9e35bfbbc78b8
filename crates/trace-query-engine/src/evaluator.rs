//! Evaluation of parsed queries against a fact store.

use tracing::debug;

use trace_query::{Conjunction, Goal};

use crate::cache::{CacheStats, TraversalCache};
use crate::matcher::{match_goal, merge, substitute, Binding};
use crate::record::FrameId;
use crate::store::FactStore;
use crate::traverser::{CallGraphTraverser, Direction, RelationshipInfo};

/// Evaluates goals and conjunctions, and answers call-graph questions.
///
/// The evaluator owns the traversal cache for its store. A new store needs
/// a new evaluator.
///
/// # Example
///
/// ```rust
/// use trace_query::{parse, QueryKind};
/// use trace_query_engine::{FactStore, FrameStatus, QueryEvaluator, Record};
///
/// let store = FactStore::from_records(&[
///     Record::new(1, "init", None, 1000, 2048, FrameStatus::Completed),
/// ]).unwrap();
/// let evaluator = QueryEvaluator::new(&store);
///
/// let QueryKind::Negated(goal) = parse("?- \\+ status(99, error).").unwrap().kind else {
///     unreachable!()
/// };
/// assert_eq!(evaluator.evaluate_negated(&goal).len(), 1);
/// ```
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    store: &'a FactStore,
    cache: TraversalCache,
    cache_enabled: bool,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates an evaluator with traversal memoization enabled.
    pub fn new(store: &'a FactStore) -> Self {
        Self::with_cache(store, true)
    }

    /// Creates an evaluator, memoizing traversals only if `cache_enabled`.
    pub fn with_cache(store: &'a FactStore, cache_enabled: bool) -> Self {
        Self {
            store,
            cache: TraversalCache::new(),
            cache_enabled,
        }
    }

    /// The store being queried.
    pub fn store(&self) -> &'a FactStore {
        self.store
    }

    /// All bindings for a goal, in store order.
    pub fn evaluate_simple(&self, goal: &Goal) -> Vec<Binding> {
        let bindings = match_goal(goal, self.store);
        debug!(
            goal = %goal,
            candidates = self.store.facts(goal.predicate).len(),
            matches = bindings.len(),
            "evaluated goal"
        );
        bindings
    }

    /// `[{}]` if the goal has no matches, otherwise empty.
    pub fn evaluate_negated(&self, goal: &Goal) -> Vec<Binding> {
        if self.has_match(goal) {
            Vec::new()
        } else {
            vec![Binding::new()]
        }
    }

    fn has_match(&self, goal: &Goal) -> bool {
        !self.evaluate_simple(goal).is_empty()
    }

    /// Left-deep join of the conjunction's conditions.
    ///
    /// Result bindings are de-duplicated and keep the order in which they
    /// were first produced. Evaluation stops as soon as no binding survives.
    pub fn evaluate_compound(&self, conjunction: &Conjunction) -> Vec<Binding> {
        let mut conditions = conjunction.conditions().iter();
        let mut current = match conditions.next() {
            Some(first) if first.negated => self.evaluate_negated(&first.goal),
            Some(first) => self.evaluate_simple(&first.goal),
            None => return Vec::new(),
        };

        for condition in conditions {
            if current.is_empty() {
                break;
            }

            let mut next: Vec<Binding> = Vec::new();
            for carried in &current {
                let goal = substitute(&condition.goal, carried);
                if condition.negated {
                    if !self.has_match(&goal) && !next.contains(carried) {
                        next.push(carried.clone());
                    }
                    continue;
                }
                for found in self.evaluate_simple(&goal) {
                    if let Some(merged) = merge(carried, &found) {
                        if !next.contains(&merged) {
                            next.push(merged);
                        }
                    }
                }
            }
            current = next;
        }

        debug!(
            conditions = conjunction.len(),
            results = current.len(),
            "evaluated conjunction"
        );
        current
    }

    fn traverser(&self) -> CallGraphTraverser<'a> {
        CallGraphTraverser::new(self.store)
    }

    /// Transitive callees or callers of `frame`, memoized per direction.
    pub fn call_chain(&self, frame: FrameId, direction: Direction) -> Vec<FrameId> {
        if !self.cache_enabled {
            return self.traverser().call_chain(frame, direction);
        }
        self.cache.get_or_insert_with(frame, direction, || {
            self.traverser().call_chain(frame, direction)
        })
    }

    /// Shortest caller → callee path, inclusive of both ends.
    pub fn call_path(&self, from: FrameId, to: FrameId) -> Option<Vec<FrameId>> {
        self.traverser().call_path(from, to)
    }

    /// Direct and transitive relationships of `frame`.
    pub fn relationship_info(&self, frame: FrameId) -> RelationshipInfo {
        let traverser = self.traverser();
        RelationshipInfo {
            frame,
            direct_caller: traverser.direct_caller(frame),
            direct_callees: traverser.direct_callees(frame),
            caller_chain: self.call_chain(frame, Direction::Callers),
            callee_chain: self.call_chain(frame, Direction::Callees),
        }
    }

    /// Traversal cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
