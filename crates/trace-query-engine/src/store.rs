//! Predicate-indexed fact storage.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use trace_query::{Predicate, Value};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::record::{FrameId, Record};
use crate::traits::CallRelation;

/// An immutable tuple stored under a predicate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fact {
    /// The predicate this fact belongs to.
    pub predicate: Predicate,
    /// Values in position order.
    pub values: Vec<Value>,
}

impl Fact {
    /// Creates a fact.
    pub fn new(predicate: Predicate, values: Vec<Value>) -> Self {
        Self { predicate, values }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ").")
    }
}

/// Facts indexed by predicate, in insertion order.
///
/// Every fact under a predicate has that predicate's arity. The store is
/// built once and only read afterwards.
///
/// # Example
///
/// ```rust
/// use trace_query::{Predicate, Value};
/// use trace_query_engine::{Fact, FactStore};
///
/// let mut store = FactStore::new();
/// store
///     .insert(Fact::new(Predicate::Status, vec![Value::Int(4), Value::atom("error")]))
///     .unwrap();
/// assert_eq!(store.facts(Predicate::Status).len(), 1);
/// assert!(store.facts(Predicate::Calls).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: BTreeMap<Predicate, Vec<Fact>>,
}

impl FactStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives every fact from a set of records.
    ///
    /// Per record: one `frame/4`, one `calls/2` when it has a caller, one
    /// `allocated/2`, one `param/3` per parameter and one `status/2`.
    pub fn from_records(records: &[Record]) -> EngineResult<Self> {
        let mut store = Self::new();
        let mut seen = HashSet::with_capacity(records.len());

        for record in records {
            if record.id == 0 {
                return Err(EngineError::InvalidFrameId(record.id));
            }
            if !seen.insert(record.id) {
                return Err(EngineError::DuplicateFrame(record.id));
            }

            let id = Value::from(record.id);
            let status = Value::atom(record.status.as_str());

            store.insert(Fact::new(
                Predicate::Frame,
                vec![
                    id.clone(),
                    Value::atom(record.name.as_str()),
                    Value::from(record.timestamp),
                    status.clone(),
                ],
            ))?;
            if let Some(caller) = record.caller {
                store.insert(Fact::new(
                    Predicate::Calls,
                    vec![Value::from(caller), id.clone()],
                ))?;
            }
            store.insert(Fact::new(
                Predicate::Allocated,
                vec![id.clone(), Value::from(record.allocated)],
            ))?;
            for (name, value) in &record.parameters {
                store.insert(Fact::new(
                    Predicate::Param,
                    vec![id.clone(), Value::atom(name.as_str()), value.clone()],
                ))?;
            }
            store.insert(Fact::new(Predicate::Status, vec![id, status]))?;
        }

        info!(
            records = records.len(),
            facts = store.len(),
            "built fact store"
        );
        Ok(store)
    }

    /// Appends a fact, rejecting it if its length is not the predicate's arity.
    pub fn insert(&mut self, fact: Fact) -> EngineResult<()> {
        let expected = fact.predicate.arity();
        if fact.values.len() != expected {
            return Err(EngineError::ArityMismatch {
                predicate: fact.predicate,
                expected,
                found: fact.values.len(),
            });
        }
        self.facts.entry(fact.predicate).or_default().push(fact);
        Ok(())
    }

    /// All facts of a predicate in insertion order (empty if none).
    pub fn facts(&self, predicate: Predicate) -> &[Fact] {
        self.facts
            .get(&predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if at least one fact exists for the predicate.
    pub fn has_facts(&self, predicate: Predicate) -> bool {
        !self.facts(predicate).is_empty()
    }

    /// Predicates with at least one fact, in name order.
    pub fn predicates(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.facts
            .iter()
            .filter(|(_, facts)| !facts.is_empty())
            .map(|(p, _)| *p)
    }

    /// Total number of facts.
    pub fn len(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }

    /// Returns true if the store holds no facts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fact counts per predicate, every predicate included.
    pub fn summary(&self) -> Vec<(Predicate, usize)> {
        Predicate::ALL
            .into_iter()
            .map(|p| (p, self.facts(p).len()))
            .collect()
    }

    /// `(caller, callee)` pairs of the `calls` relation, in store order.
    ///
    /// Facts whose positions are not frame identifiers are skipped.
    pub fn call_edges(&self) -> impl Iterator<Item = (FrameId, FrameId)> + '_ {
        self.facts(Predicate::Calls).iter().filter_map(|fact| {
            let caller = fact.values.first()?.as_int()?;
            let callee = fact.values.get(1)?.as_int()?;
            Some((u64::try_from(caller).ok()?, u64::try_from(callee).ok()?))
        })
    }
}

impl CallRelation for FactStore {
    fn callees(&self, frame: FrameId) -> Vec<FrameId> {
        self.call_edges()
            .filter(|(caller, _)| *caller == frame)
            .map(|(_, callee)| callee)
            .collect()
    }

    fn callers(&self, frame: FrameId) -> Vec<FrameId> {
        self.call_edges()
            .filter(|(_, callee)| *callee == frame)
            .map(|(caller, _)| caller)
            .collect()
    }
}
