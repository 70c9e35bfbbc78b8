//! The closed predicate vocabulary of trace queries.

use std::fmt;

/// A predicate known to the query language.
///
/// Each predicate has a fixed arity. Adding a predicate means adding a
/// variant here and its entry in [`Predicate::arity`] and
/// [`Predicate::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Predicate {
    /// `allocated(FrameId, Bytes)`
    Allocated,
    /// `calls(CallerId, CalleeId)`
    Calls,
    /// `frame(FrameId, FunctionName, Timestamp, Status)`
    Frame,
    /// `param(FrameId, ParamName, Value)`
    Param,
    /// `status(FrameId, Status)`
    Status,
}

impl Predicate {
    /// Every predicate, in name order.
    pub const ALL: [Predicate; 5] = [
        Predicate::Allocated,
        Predicate::Calls,
        Predicate::Frame,
        Predicate::Param,
        Predicate::Status,
    ];

    /// The surface-syntax name of the predicate.
    pub fn name(self) -> &'static str {
        match self {
            Predicate::Allocated => "allocated",
            Predicate::Calls => "calls",
            Predicate::Frame => "frame",
            Predicate::Param => "param",
            Predicate::Status => "status",
        }
    }

    /// Number of positions in every fact stored under this predicate.
    pub fn arity(self) -> usize {
        match self {
            Predicate::Allocated => 2,
            Predicate::Calls => 2,
            Predicate::Frame => 4,
            Predicate::Param => 3,
            Predicate::Status => 2,
        }
    }

    /// Looks up a predicate by its surface-syntax name.
    pub fn from_name(name: &str) -> Option<Predicate> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of predicates a validator accepts.
///
/// Supplied by the caller at construction time. Defaults to every
/// [`Predicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    predicates: Vec<Predicate>,
}

impl Vocabulary {
    /// Creates a vocabulary from the given predicates (duplicates are dropped).
    pub fn new(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut predicates: Vec<Predicate> = predicates.into_iter().collect();
        predicates.sort_unstable();
        predicates.dedup();
        Self { predicates }
    }

    /// A vocabulary containing every known predicate.
    pub fn all() -> Self {
        Self::new(Predicate::ALL)
    }

    /// Returns true if `predicate` is part of this vocabulary.
    pub fn contains(&self, predicate: Predicate) -> bool {
        self.predicates.contains(&predicate)
    }

    /// Resolves a name to a predicate of this vocabulary.
    pub fn resolve(&self, name: &str) -> Option<Predicate> {
        Predicate::from_name(name).filter(|p| self.contains(*p))
    }

    /// Predicate names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    /// Iterates over the predicates in name order.
    pub fn iter(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.predicates.iter().copied()
    }

    /// Number of predicates in the vocabulary.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if the vocabulary accepts nothing.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_table() {
        assert_eq!(Predicate::Frame.arity(), 4);
        assert_eq!(Predicate::Calls.arity(), 2);
        assert_eq!(Predicate::Allocated.arity(), 2);
        assert_eq!(Predicate::Param.arity(), 3);
        assert_eq!(Predicate::Status.arity(), 2);
    }

    #[test]
    fn test_from_name_round_trips() {
        for predicate in Predicate::ALL {
            assert_eq!(Predicate::from_name(predicate.name()), Some(predicate));
        }
        assert_eq!(Predicate::from_name("Frame"), None);
        assert_eq!(Predicate::from_name("likes"), None);
    }

    #[test]
    fn test_vocabulary_names_sorted() {
        let vocab = Vocabulary::new([Predicate::Status, Predicate::Calls, Predicate::Status]);
        assert_eq!(vocab.names(), vec!["calls", "status"]);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn test_vocabulary_resolve_respects_membership() {
        let vocab = Vocabulary::new([Predicate::Frame]);
        assert_eq!(vocab.resolve("frame"), Some(Predicate::Frame));
        assert_eq!(vocab.resolve("calls"), None);
        assert!(Vocabulary::default().contains(Predicate::Calls));
    }
}
