//! Call-graph traversal over the `calls` relation.
//!
//! This module provides [`CallGraphTraverser`], which walks the relation
//! with BFS (Breadth-First Search). A visited set guards every walk, so
//! traversal terminates even if the relation contains a cycle.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::record::FrameId;
use crate::traits::CallRelation;

/// Which way to follow the `calls` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Frames called by the start frame, transitively.
    Callees,
    /// Frames that called the start frame, transitively.
    Callers,
}

impl Direction {
    /// The direction's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Callees => "callees",
            Direction::Callers => "callers",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "callees" => Ok(Direction::Callees),
            "callers" => Ok(Direction::Callers),
            other => Err(EngineError::UnknownDirection(other.to_string())),
        }
    }
}

/// Traverses a [`CallRelation`] using BFS.
///
/// # Example
///
/// ```rust
/// use trace_query_engine::{CallGraphTraverser, Direction, FactStore, FrameStatus, Record};
///
/// let records = vec![
///     Record::new(1, "main", None, 1000, 1024, FrameStatus::Active),
///     Record::new(2, "parse_input", Some(1), 1010, 1024, FrameStatus::Active),
///     Record::new(3, "validate_data", Some(2), 1020, 1024, FrameStatus::Active),
/// ];
/// let store = FactStore::from_records(&records).unwrap();
/// let traverser = CallGraphTraverser::new(&store);
///
/// assert_eq!(traverser.call_chain(1, Direction::Callees), vec![2, 3]);
/// assert_eq!(traverser.call_path(1, 3), Some(vec![1, 2, 3]));
/// ```
pub struct CallGraphTraverser<'a> {
    relation: &'a dyn CallRelation,
}

impl<'a> CallGraphTraverser<'a> {
    /// Creates a traverser over the given relation.
    pub fn new(relation: &'a dyn CallRelation) -> Self {
        Self { relation }
    }

    fn neighbours(&self, frame: FrameId, direction: Direction) -> Vec<FrameId> {
        match direction {
            Direction::Callees => self.relation.callees(frame),
            Direction::Callers => self.relation.callers(frame),
        }
    }

    /// Every frame reachable from `start` in `direction`, in BFS order.
    ///
    /// Does NOT include `start` itself, even when a cycle leads back to it.
    pub fn call_chain(&self, start: FrameId, direction: Direction) -> Vec<FrameId> {
        let mut visited = HashSet::with_capacity(64);
        let mut queue = VecDeque::with_capacity(16);
        let mut chain = Vec::new();

        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbours(current, direction) {
                if visited.insert(next) {
                    chain.push(next);
                    queue.push_back(next);
                }
            }
        }

        chain
    }

    /// Shortest caller → callee path from `from` to `to`, both included.
    ///
    /// Returns `Some(vec![from])` when the endpoints are equal and `None`
    /// when `to` is unreachable. Ties go to the first path in enumeration
    /// order.
    pub fn call_path(&self, from: FrameId, to: FrameId) -> Option<Vec<FrameId>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut parents: HashMap<FrameId, FrameId> = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for callee in self.relation.callees(current) {
                if !visited.insert(callee) {
                    continue;
                }
                parents.insert(callee, current);
                if callee == to {
                    return Some(Self::unwind(&parents, from, to));
                }
                queue.push_back(callee);
            }
        }

        None
    }

    fn unwind(parents: &HashMap<FrameId, FrameId>, from: FrameId, to: FrameId) -> Vec<FrameId> {
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            match parents.get(&current) {
                Some(&parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// The first direct caller of `frame`, if any.
    pub fn direct_caller(&self, frame: FrameId) -> Option<FrameId> {
        self.relation.callers(frame).into_iter().next()
    }

    /// Frames called directly by `frame`.
    pub fn direct_callees(&self, frame: FrameId) -> Vec<FrameId> {
        self.relation.callees(frame)
    }
}

/// Direct and transitive call relationships of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationshipInfo {
    /// The frame described.
    pub frame: FrameId,
    /// Its direct caller (None for a root frame).
    pub direct_caller: Option<FrameId>,
    /// Frames it calls directly.
    pub direct_callees: Vec<FrameId>,
    /// Transitive callers, nearest first.
    pub caller_chain: Vec<FrameId>,
    /// Transitive callees, nearest first.
    pub callee_chain: Vec<FrameId>,
}

fn join_ids(ids: &[FrameId], sep: &str) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for RelationshipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Relationship information for frame {}:", self.frame)?;
        writeln!(f)?;

        match self.direct_caller {
            Some(caller) => writeln!(f, "  Direct caller: frame {}", caller)?,
            None => writeln!(f, "  Direct caller: none (root frame)")?,
        }
        if self.direct_callees.is_empty() {
            writeln!(f, "  Direct callees: none (leaf frame)")?;
        } else {
            let callees: Vec<String> = self
                .direct_callees
                .iter()
                .map(|c| format!("frame {}", c))
                .collect();
            writeln!(f, "  Direct callees: {}", callees.join(", "))?;
        }
        writeln!(f)?;

        if self.caller_chain.is_empty() {
            writeln!(f, "  Complete caller chain: (this is a root frame)")?;
        } else {
            // Outermost caller first
            let outermost_first: Vec<FrameId> = self.caller_chain.iter().rev().copied().collect();
            writeln!(
                f,
                "  Complete caller chain: {} -> {}",
                join_ids(&outermost_first, " -> "),
                self.frame
            )?;
        }
        if self.callee_chain.is_empty() {
            write!(f, "  Complete callee chain: (this is a leaf frame)")
        } else {
            write!(
                f,
                "  Complete callee chain: {} -> {}",
                self.frame,
                join_ids(&self.callee_chain, " -> ")
            )
        }
    }
}
