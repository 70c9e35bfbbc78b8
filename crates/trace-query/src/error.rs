//! Error types for query validation.

use thiserror::Error;

/// Reasons a query string fails validation.
///
/// Every variant carries a corrective hint, available through
/// [`QueryError::hint`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Nothing but whitespace was entered.
    #[error("Empty input - please enter a query.")]
    EmptyInput,

    /// The query does not start with `?-`.
    #[error("Missing query prefix '?-'.")]
    MissingPrefix,

    /// The query does not end with `.`.
    #[error("Missing period at the end.")]
    MissingTerminator,

    /// Nothing between `?-` and `.`.
    #[error("Empty query body.")]
    EmptyBody,

    /// `\+` with nothing after it.
    #[error("Empty negation query.")]
    EmptyNegation,

    /// The goal after `\+` is invalid.
    #[error("Error in negated query: {0}")]
    InNegation(Box<QueryError>),

    /// A compound query with nothing between two commas, or after the last one.
    #[error("Empty condition in compound query.")]
    EmptyCondition,

    /// One condition of a compound query is invalid.
    #[error("Error in condition {index}: {error}")]
    InCondition {
        /// 1-based position of the failing condition.
        index: usize,
        /// Why the condition failed.
        error: Box<QueryError>,
    },

    /// The goal has no `(` or no `)`.
    #[error("Missing parentheses around arguments.")]
    MissingParentheses,

    /// Nothing before the opening parenthesis.
    #[error("Missing predicate name.")]
    MissingPredicate,

    /// The predicate name starts with an uppercase letter.
    #[error("Predicate names must start with a lowercase letter.")]
    UppercasePredicate(String),

    /// The predicate name contains characters outside `[A-Za-z0-9_]`.
    #[error("Invalid predicate name '{0}'.")]
    InvalidPredicate(String),

    /// The predicate is not part of the configured vocabulary.
    #[error("Unknown predicate '{name}'.")]
    UnknownPredicate {
        /// The name as written.
        name: String,
        /// The vocabulary, sorted.
        known: Vec<String>,
    },

    /// Not exactly one balanced pair of parentheses.
    #[error("Mismatched parentheses.")]
    MismatchedParentheses,

    /// Text after the closing parenthesis.
    #[error("Unexpected input after ')': '{0}'.")]
    TrailingInput(String),

    /// `pred()` with no arguments.
    #[error("Empty argument list.")]
    EmptyArguments(String),

    /// `pred(a, , b)` or a trailing comma.
    #[error("Empty argument in query.")]
    EmptyArgument,

    /// An argument that is not an atom, variable, or unsigned integer.
    #[error("Invalid argument '{0}'.")]
    InvalidArgument(String),
}

impl QueryError {
    /// A corrective hint for the user.
    pub fn hint(&self) -> String {
        match self {
            QueryError::EmptyInput => {
                "A query should look like: ?- predicate(argument1, argument2).".to_string()
            }
            QueryError::MissingPrefix => {
                "All queries must start with '?-'. Try: ?- predicate(arguments).".to_string()
            }
            QueryError::MissingTerminator => {
                "All queries must end with a period (.).".to_string()
            }
            QueryError::EmptyBody => {
                "You need to specify what you want to query. Example: ?- frame(1, X, Y, Z)."
                    .to_string()
            }
            QueryError::EmptyNegation => {
                "Specify what you want to check for absence. Example: ?- \\+ status(1, error)."
                    .to_string()
            }
            QueryError::InNegation(inner) => inner.hint(),
            QueryError::EmptyCondition => {
                "Remove the extra comma or add a goal after it: ?- pred1(...), pred2(...)."
                    .to_string()
            }
            QueryError::InCondition { error, .. } => error.hint(),
            QueryError::MissingParentheses => {
                "Queries need parentheses: ?- predicate(argument1, argument2).".to_string()
            }
            QueryError::MissingPredicate => {
                "Specify what you want to query. Example: ?- frame(1, X, Y, Z).".to_string()
            }
            QueryError::UppercasePredicate(name) => {
                format!("Try changing '{}' to start with lowercase.", name)
            }
            QueryError::InvalidPredicate(_) => {
                "Predicate names should contain only letters, numbers, and underscores."
                    .to_string()
            }
            QueryError::UnknownPredicate { known, .. } => {
                format!("Valid predicates are: {}.", known.join(", "))
            }
            QueryError::MismatchedParentheses => {
                "Make sure the goal has exactly one '(' with a matching ')'.".to_string()
            }
            QueryError::TrailingInput(_) => {
                "Separate conditions with commas: ?- pred1(...), pred2(...).".to_string()
            }
            QueryError::EmptyArguments(predicate) => format!(
                "The {0} predicate requires arguments. Example: ?- {0}(arg1, arg2).",
                predicate
            ),
            QueryError::EmptyArgument => {
                "Check for extra commas or missing arguments.".to_string()
            }
            QueryError::InvalidArgument(_) => {
                "Arguments should be atoms (lowercase), variables (uppercase), or numbers."
                    .to_string()
            }
        }
    }

    /// The innermost error, unwrapping negation and condition context.
    pub fn root(&self) -> &QueryError {
        match self {
            QueryError::InNegation(inner) => inner.root(),
            QueryError::InCondition { error, .. } => error.root(),
            other => other,
        }
    }
}

/// Result type for query parsing.
pub type ParseResult<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prefix_message() {
        let err = QueryError::MissingPrefix;
        assert_eq!(err.to_string(), "Missing query prefix '?-'.");
        assert!(err.hint().contains("?-"));
    }

    #[test]
    fn test_condition_wrapping() {
        let err = QueryError::InCondition {
            index: 2,
            error: Box::new(QueryError::InvalidArgument("x-1".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Error in condition 2: Invalid argument 'x-1'."
        );
        assert_eq!(err.root(), &QueryError::InvalidArgument("x-1".to_string()));
        assert!(err.hint().starts_with("Arguments should be"));
    }

    #[test]
    fn test_unknown_predicate_hint_lists_vocabulary() {
        let err = QueryError::UnknownPredicate {
            name: "likes".to_string(),
            known: vec!["calls".to_string(), "frame".to_string()],
        };
        assert_eq!(err.hint(), "Valid predicates are: calls, frame.");
    }

    #[test]
    fn test_empty_condition_message() {
        let err = QueryError::InCondition {
            index: 2,
            error: Box::new(QueryError::EmptyCondition),
        };
        assert_eq!(
            err.to_string(),
            "Error in condition 2: Empty condition in compound query."
        );
        assert!(err.hint().contains("extra comma"));
    }

    #[test]
    fn test_negation_wrapping() {
        let err = QueryError::InNegation(Box::new(QueryError::MissingParentheses));
        assert_eq!(
            err.to_string(),
            "Error in negated query: Missing parentheses around arguments."
        );
    }
}
