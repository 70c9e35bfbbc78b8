//! Heuristic detection of significant discoveries.
//!
//! Classification runs an ordered list of [`SignificanceRule`]s over a goal
//! and its matches. The first rule that fires names the discovery; priority
//! is the position in the list.

use std::fmt;

use trace_query::{Goal, Predicate, Value};

use crate::config::SignificanceConfig;
use crate::matcher::Binding;

/// The kind of a significant discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiscoveryKind {
    /// A frame with error status.
    Error,
    /// Many call edges, suggesting runaway recursion.
    Recursion,
    /// An allocation above the memory threshold.
    MemoryAnomaly,
    /// A parameter holding the null sentinel.
    NullParameter,
    /// A frame waiting for a lock.
    Deadlock,
    /// A large result set.
    Pattern,
}

impl DiscoveryKind {
    /// The kind's snake_case tag.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryKind::Error => "error",
            DiscoveryKind::Recursion => "recursion",
            DiscoveryKind::MemoryAnomaly => "memory_anomaly",
            DiscoveryKind::NullParameter => "null_parameter",
            DiscoveryKind::Deadlock => "deadlock",
            DiscoveryKind::Pattern => "pattern",
        }
    }

    /// Banner headline announcing the discovery.
    pub fn headline(self) -> &'static str {
        match self {
            DiscoveryKind::Error => "SIGNIFICANT: Error status detected!",
            DiscoveryKind::Recursion => "SIGNIFICANT: Recursive call pattern detected!",
            DiscoveryKind::MemoryAnomaly => "SIGNIFICANT: High memory allocation detected!",
            DiscoveryKind::NullParameter => "SIGNIFICANT: Null parameter detected!",
            DiscoveryKind::Deadlock => "SIGNIFICANT: Potential deadlock detected!",
            DiscoveryKind::Pattern => "SIGNIFICANT: Pattern detected in results!",
        }
    }
}

impl fmt::Display for DiscoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule inspects: the goal, its matches and every matched value.
///
/// Matched values are the bound values of all matches followed by the
/// goal's constant arguments.
#[derive(Debug)]
pub struct Observation<'a> {
    /// The goal that was evaluated.
    pub goal: &'a Goal,
    /// Its matches, in store order.
    pub matches: &'a [Binding],
    /// Bound values and constant arguments.
    pub values: Vec<&'a Value>,
}

impl<'a> Observation<'a> {
    /// Collects the observation for a goal and its matches.
    pub fn new(goal: &'a Goal, matches: &'a [Binding]) -> Self {
        let values = matches
            .iter()
            .flat_map(|binding| binding.values())
            .chain(goal.args.iter().filter_map(|term| term.constant_value()))
            .collect();
        Self {
            goal,
            matches,
            values,
        }
    }

    fn predicate_is(&self, predicate: Predicate) -> bool {
        self.goal.predicate == predicate
    }

    fn has_atom(&self, atom: &str) -> bool {
        self.values.iter().any(|v| v.as_atom() == Some(atom))
    }
}

type RuleTest = Box<dyn Fn(&Observation<'_>) -> bool>;

/// A single classifier: fires when its test holds for an observation.
pub struct SignificanceRule {
    kind: DiscoveryKind,
    test: RuleTest,
}

impl SignificanceRule {
    /// Creates a rule reporting `kind` when `test` holds.
    pub fn new(kind: DiscoveryKind, test: impl Fn(&Observation<'_>) -> bool + 'static) -> Self {
        Self {
            kind,
            test: Box::new(test),
        }
    }

    /// The kind reported by this rule.
    pub fn kind(&self) -> DiscoveryKind {
        self.kind
    }

    /// Returns true if the rule fires for the observation.
    pub fn applies(&self, observation: &Observation<'_>) -> bool {
        (self.test)(observation)
    }

    /// `status` match involving the `error` atom.
    pub fn error() -> Self {
        Self::new(DiscoveryKind::Error, |obs| {
            obs.predicate_is(Predicate::Status) && obs.has_atom("error")
        })
    }

    /// More than `threshold` `calls` matches.
    pub fn recursion(threshold: usize) -> Self {
        Self::new(DiscoveryKind::Recursion, move |obs| {
            obs.predicate_is(Predicate::Calls) && obs.matches.len() > threshold
        })
    }

    /// An `allocated` value above `threshold` bytes.
    pub fn memory_anomaly(threshold: u64) -> Self {
        let limit = threshold as f64;
        Self::new(DiscoveryKind::MemoryAnomaly, move |obs| {
            obs.predicate_is(Predicate::Allocated)
                && obs
                    .values
                    .iter()
                    .filter_map(|v| v.as_f64())
                    .any(|bytes| bytes > limit)
        })
    }

    /// A `param` value that is the null sentinel.
    pub fn null_parameter() -> Self {
        Self::new(DiscoveryKind::NullParameter, |obs| {
            obs.predicate_is(Predicate::Param) && obs.values.iter().any(|v| v.is_null())
        })
    }

    /// A `param` match involving `waiting_for`.
    pub fn deadlock() -> Self {
        Self::new(DiscoveryKind::Deadlock, |obs| {
            obs.predicate_is(Predicate::Param) && obs.has_atom("waiting_for")
        })
    }

    /// More than `threshold` matches on any predicate.
    pub fn pattern(threshold: usize) -> Self {
        Self::new(DiscoveryKind::Pattern, move |obs| obs.matches.len() > threshold)
    }
}

impl fmt::Debug for SignificanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignificanceRule")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered rule list; the first rule that fires wins.
///
/// # Example
///
/// ```rust
/// use trace_query::{parse, QueryKind, Value};
/// use trace_query_engine::{Binding, DiscoveryKind, SignificanceDetector};
///
/// let query = parse("?- status(X, error).").unwrap();
/// let QueryKind::Simple(goal) = query.kind else { unreachable!() };
///
/// let mut binding = Binding::new();
/// binding.insert("X".to_string(), Value::Int(4));
///
/// let detector = SignificanceDetector::default();
/// assert_eq!(detector.classify(&goal, &[binding]), Some(DiscoveryKind::Error));
/// assert_eq!(detector.classify(&goal, &[]), None);
/// ```
#[derive(Debug)]
pub struct SignificanceDetector {
    rules: Vec<SignificanceRule>,
}

impl SignificanceDetector {
    /// The standard rules, in priority order, with the given thresholds.
    pub fn new(config: &SignificanceConfig) -> Self {
        Self::with_rules(vec![
            SignificanceRule::error(),
            SignificanceRule::recursion(config.recursion_threshold),
            SignificanceRule::memory_anomaly(config.memory_threshold),
            SignificanceRule::null_parameter(),
            SignificanceRule::deadlock(),
            SignificanceRule::pattern(config.pattern_threshold),
        ])
    }

    /// A detector running exactly `rules`, in order.
    pub fn with_rules(rules: Vec<SignificanceRule>) -> Self {
        Self { rules }
    }

    /// The rules in priority order.
    pub fn rules(&self) -> &[SignificanceRule] {
        &self.rules
    }

    /// Classifies a goal's matches. An empty match list is never significant.
    pub fn classify(&self, goal: &Goal, matches: &[Binding]) -> Option<DiscoveryKind> {
        if matches.is_empty() {
            return None;
        }
        let observation = Observation::new(goal, matches);
        self.rules
            .iter()
            .find(|rule| rule.applies(&observation))
            .map(SignificanceRule::kind)
    }
}

impl Default for SignificanceDetector {
    fn default() -> Self {
        Self::new(&SignificanceConfig::default())
    }
}
