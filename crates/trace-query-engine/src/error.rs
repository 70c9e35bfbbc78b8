//! Error types for the query engine.

use thiserror::Error;
use trace_query::Predicate;

/// Errors raised while building a fact store or driving traversal.
///
/// Query syntax errors never cross the engine boundary as errors; see
/// [`ValidationResult`](crate::ValidationResult).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Query parse error from the trace-query validator.
    #[error("Query parse error: {0}")]
    ParseError(#[from] trace_query::QueryError),

    /// A fact does not have its predicate's arity.
    #[error("Arity mismatch for {predicate}: expected {expected}, found {found}")]
    ArityMismatch {
        /// Predicate the fact was stored under.
        predicate: Predicate,
        /// The predicate's arity.
        expected: usize,
        /// The fact's length.
        found: usize,
    },

    /// Two records share an identifier.
    #[error("Duplicate frame id: {0}")]
    DuplicateFrame(u64),

    /// Frame identifiers start at 1.
    #[error("Invalid frame id: {0}")]
    InvalidFrameId(u64),

    /// Traversal direction other than `callees` or `callers`.
    #[error("Unknown direction '{0}': expected 'callees' or 'callers'")]
    UnknownDirection(String),

    /// Frame status other than `active`, `completed` or `error`.
    #[error("Unknown frame status '{0}': expected 'active', 'completed' or 'error'")]
    UnknownStatus(String),

    /// Scenario name that is not one of the known failure scenarios.
    #[error("Unknown failure scenario: {0}")]
    UnknownScenario(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
