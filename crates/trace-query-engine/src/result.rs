//! Boundary objects returned by the query engine.

use std::time::Duration;

use trace_query::{ParsedQuery, QueryError};

use crate::matcher::Binding;
use crate::significance::DiscoveryKind;

/// Outcome of validating a query string.
///
/// Validation failures are data, never panics or `Err`s crossing the
/// engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the query is well formed.
    pub is_valid: bool,
    /// Human-readable problem description (empty when valid).
    pub error_message: String,
    /// Corrective hint (empty when valid).
    pub hint: String,
    /// The parsed query when valid.
    pub parsed: Option<ParsedQuery>,
    /// The query text as submitted.
    pub source: String,
}

impl ValidationResult {
    /// A successful validation.
    pub fn valid(source: impl Into<String>, parsed: ParsedQuery) -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
            hint: String::new(),
            parsed: Some(parsed),
            source: source.into(),
        }
    }

    /// A failed validation carrying the error's message and hint.
    pub fn from_error(source: impl Into<String>, error: &QueryError) -> Self {
        Self {
            is_valid: false,
            error_message: error.to_string(),
            hint: error.hint(),
            parsed: None,
            source: source.into(),
        }
    }
}

/// Result of evaluating a valid query.
///
/// # Example
///
/// ```rust
/// use trace_query_engine::{FactStore, FrameStatus, QueryEngine, Record};
///
/// let store = FactStore::from_records(&[
///     Record::new(4, "process_request", None, 1000, 2048, FrameStatus::Error),
/// ]).unwrap();
/// let engine = QueryEngine::new(&store);
///
/// let result = engine.run("?- status(X, error).").into_result().unwrap();
/// assert_eq!(result.count(), 1);
/// assert_eq!(result.variables, vec!["X".to_string()]);
/// assert!(result.is_significant);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Bindings in result order.
    pub bindings: Vec<Binding>,
    /// Named variables of the query, first-appearance order.
    pub variables: Vec<String>,
    /// Rendered text for display.
    pub output: String,
    /// Whether a significant discovery was detected.
    pub is_significant: bool,
    /// The discovery kind when significant.
    pub discovery: Option<DiscoveryKind>,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

impl QueryResult {
    /// Number of bindings.
    pub fn count(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the query produced no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns true if at least one binding was produced.
    ///
    /// A negated query succeeds with a single empty binding.
    pub fn succeeded(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Returns an iterator over the bindings.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Statistics from query evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Total evaluation duration.
    pub duration: Duration,
    /// Number of candidate facts examined.
    pub facts_scanned: usize,
}

impl ExecutionStats {
    /// Creates new execution stats.
    pub fn new(duration: Duration, facts_scanned: usize) -> Self {
        Self {
            duration,
            facts_scanned,
        }
    }
}

/// What [`QueryEngine::run`](crate::QueryEngine::run) returns.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// The query failed validation; nothing was evaluated.
    Invalid(ValidationResult),
    /// The query was evaluated.
    Evaluated(QueryResult),
}

impl QueryResponse {
    /// Returns true if the query was evaluated.
    pub fn is_valid(&self) -> bool {
        matches!(self, QueryResponse::Evaluated(_))
    }

    /// Text for display: the rendered result, or the error and its hint.
    pub fn output(&self) -> String {
        match self {
            QueryResponse::Evaluated(result) => result.output.clone(),
            QueryResponse::Invalid(validation) => {
                format!("Error: {}\nHint: {}", validation.error_message, validation.hint)
            }
        }
    }

    /// The evaluation result, if any.
    pub fn into_result(self) -> Option<QueryResult> {
        match self {
            QueryResponse::Evaluated(result) => Some(result),
            QueryResponse::Invalid(_) => None,
        }
    }

    /// The validation failure, if any.
    pub fn into_validation(self) -> Option<ValidationResult> {
        match self {
            QueryResponse::Invalid(validation) => Some(validation),
            QueryResponse::Evaluated(_) => None,
        }
    }
}
