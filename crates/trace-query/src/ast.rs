//! Abstract syntax types for trace queries.

use std::fmt;

use crate::predicate::Predicate;

// =============================================================================
// Values
// =============================================================================

/// A scalar stored in a fact or written as a query constant.
///
/// Integers and floats compare numerically, so `Int(2048)` equals
/// `Float(2048.0)`. `Null` is the null sentinel and renders as `null`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Atomic string.
    Atom(String),
    /// Null sentinel.
    Null,
}

impl Value {
    /// Builds an atom value.
    pub fn atom(s: impl Into<String>) -> Self {
        Value::Atom(s.into())
    }

    /// Coerces a constant token to a value.
    ///
    /// Tries an integer parse, then a float parse, then the `null` sentinel,
    /// and otherwise keeps the token as an atom. Numeric parses are only
    /// attempted for tokens starting with a digit, so atoms such as `inf`
    /// stay atoms.
    pub fn parse_constant(token: &str) -> Self {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            if let Ok(n) = token.parse::<i64>() {
                return Value::Int(n);
            }
            if let Ok(x) = token.parse::<f64>() {
                return Value::Float(x);
            }
        }
        if token == "null" {
            return Value::Null;
        }
        Value::Atom(token.to_string())
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the atom text if the value is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Value::Atom(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Atom(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Atom(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Atom(s)
    }
}

// =============================================================================
// Terms
// =============================================================================

/// One argument position of a goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// A constant compared by value.
    Constant(Value),
    /// A named variable (`X`, `Frame`, `_Tmp`).
    Variable(String),
    /// The anonymous variable `_`: matches anything, never binds.
    Anonymous,
}

impl Term {
    /// Builds a term from a lexically valid argument token.
    pub fn from_token(token: &str) -> Self {
        if token == "_" {
            Term::Anonymous
        } else if token.starts_with(|c: char| c.is_ascii_uppercase() || c == '_') {
            Term::Variable(token.to_string())
        } else {
            Term::Constant(Value::parse_constant(token))
        }
    }

    /// Shorthand for a named variable.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Shorthand for a constant.
    pub fn constant(value: impl Into<Value>) -> Self {
        Term::Constant(value.into())
    }

    /// Returns true for named and anonymous variables.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_) | Term::Anonymous)
    }

    /// The name of a named variable.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// The value of a constant.
    pub fn constant_value(&self) -> Option<&Value> {
        match self {
            Term::Constant(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(v) => write!(f, "{}", v),
            Term::Variable(name) => f.write_str(name),
            Term::Anonymous => f.write_str("_"),
        }
    }
}

// =============================================================================
// Goals and queries
// =============================================================================

/// A single predicate application: `frame(1, Name, _, Status)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Goal {
    /// The predicate applied.
    pub predicate: Predicate,
    /// Argument terms in position order.
    pub args: Vec<Term>,
}

impl Goal {
    /// Creates a goal.
    pub fn new(predicate: Predicate, args: Vec<Term>) -> Self {
        Self { predicate, args }
    }

    /// Number of arguments written in the query.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Named variables in first-appearance order, without repeats.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for name in self.args.iter().filter_map(Term::variable_name) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Returns true if any argument is a (named or anonymous) variable.
    pub fn has_variables(&self) -> bool {
        self.args.iter().any(Term::is_variable)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// One condition of a compound query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    /// The goal tested by this condition.
    pub goal: Goal,
    /// Whether the condition is written `\+ goal`.
    pub negated: bool,
}

impl Condition {
    /// A positive condition.
    pub fn positive(goal: Goal) -> Self {
        Self {
            goal,
            negated: false,
        }
    }

    /// A negated condition.
    pub fn negated(goal: Goal) -> Self {
        Self {
            goal,
            negated: true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "\\+ ")?;
        }
        write!(f, "{}", self.goal)
    }
}

/// Two or more conditions joined by commas.
///
/// Can only be built with at least two conditions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conjunction {
    conditions: Vec<Condition>,
}

impl Conjunction {
    /// Builds a conjunction, or `None` when fewer than two conditions are given.
    pub fn new(conditions: Vec<Condition>) -> Option<Self> {
        if conditions.len() < 2 {
            return None;
        }
        Some(Self { conditions })
    }

    /// The conditions in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Number of conditions (always at least two).
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Union of named variables over all conditions, first-appearance order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for condition in &self.conditions {
            for name in condition.goal.variables() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

/// The shape of a validated query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryKind {
    /// `?- goal.`
    Simple(Goal),
    /// `?- \+ goal.`
    Negated(Goal),
    /// `?- cond, cond, ... .`
    Compound(Conjunction),
}

/// A validated query, with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedQuery {
    /// The query text as submitted (trimmed).
    pub source: String,
    /// The parsed structure.
    pub kind: QueryKind,
}

impl ParsedQuery {
    /// Creates a parsed query.
    pub fn new(source: impl Into<String>, kind: QueryKind) -> Self {
        Self {
            source: source.into(),
            kind,
        }
    }

    /// Short tag naming the query shape: `simple`, `negation` or `compound`.
    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            QueryKind::Simple(_) => "simple",
            QueryKind::Negated(_) => "negation",
            QueryKind::Compound(_) => "compound",
        }
    }

    /// Predicates used by the query in condition order.
    pub fn predicates(&self) -> Vec<Predicate> {
        match &self.kind {
            QueryKind::Simple(goal) | QueryKind::Negated(goal) => vec![goal.predicate],
            QueryKind::Compound(conj) => conj
                .conditions()
                .iter()
                .map(|c| c.goal.predicate)
                .collect(),
        }
    }

    /// Named variables of the whole query, first-appearance order.
    pub fn variables(&self) -> Vec<&str> {
        match &self.kind {
            QueryKind::Simple(goal) | QueryKind::Negated(goal) => goal.variables(),
            QueryKind::Compound(conj) => conj.variables(),
        }
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            QueryKind::Simple(goal) => write!(f, "?- {}.", goal),
            QueryKind::Negated(goal) => write!(f, "?- \\+ {}.", goal),
            QueryKind::Compound(conj) => write!(f, "?- {}.", conj),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant_order() {
        assert_eq!(Value::parse_constant("2048"), Value::Int(2048));
        assert!(matches!(
            Value::parse_constant("99999999999999999999"),
            Value::Float(_)
        ));
        assert_eq!(Value::parse_constant("null"), Value::Null);
        assert_eq!(Value::parse_constant("error"), Value::atom("error"));
        // Numeric parses only apply to digit-initial tokens
        assert_eq!(Value::parse_constant("inf"), Value::atom("inf"));
        assert_eq!(Value::parse_constant("nan"), Value::atom("nan"));
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        assert_eq!(Value::Int(2048), Value::Float(2048.0));
        assert_ne!(Value::Int(1), Value::atom("1"));
        assert_ne!(Value::Null, Value::atom("none"));
    }

    #[test]
    fn test_term_from_token() {
        assert_eq!(Term::from_token("_"), Term::Anonymous);
        assert_eq!(Term::from_token("X"), Term::var("X"));
        assert_eq!(Term::from_token("_Tmp"), Term::var("_Tmp"));
        assert_eq!(Term::from_token("42"), Term::constant(42i64));
        assert_eq!(Term::from_token("init"), Term::constant("init"));
    }

    #[test]
    fn test_goal_variables_dedup_and_skip_anonymous() {
        let goal = Goal::new(
            Predicate::Frame,
            vec![Term::var("X"), Term::Anonymous, Term::var("Y"), Term::var("X")],
        );
        assert_eq!(goal.variables(), vec!["X", "Y"]);
        assert!(goal.has_variables());
    }

    #[test]
    fn test_conjunction_requires_two_conditions() {
        let goal = Goal::new(Predicate::Status, vec![Term::var("X"), Term::constant("error")]);
        assert!(Conjunction::new(vec![Condition::positive(goal.clone())]).is_none());
        let conj = Conjunction::new(vec![
            Condition::positive(goal.clone()),
            Condition::negated(goal),
        ])
        .unwrap();
        assert_eq!(conj.len(), 2);
        assert_eq!(conj.to_string(), "status(X, error), \\+ status(X, error)");
    }

    #[test]
    fn test_parsed_query_display() {
        let goal = Goal::new(Predicate::Calls, vec![Term::constant(1i64), Term::Anonymous]);
        let query = ParsedQuery::new("?- \\+ calls(1,_).", QueryKind::Negated(goal));
        assert_eq!(query.to_string(), "?- \\+ calls(1, _).");
        assert_eq!(query.type_tag(), "negation");
        assert_eq!(query.predicates(), vec![Predicate::Calls]);
    }
}
