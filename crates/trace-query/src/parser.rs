//! Query validation and parsing.
//!
//! Queries have the shape `?- body.` where the body is a single goal, a
//! negated goal (`\+ goal`), or a comma-separated list of possibly negated
//! goals. Validation rules are checked in a fixed order and the first
//! failure is reported.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{digit1, satisfy},
    combinator::{all_consuming, map, recognize},
    sequence::pair,
    IResult,
};

use crate::ast::{Condition, Conjunction, Goal, ParsedQuery, QueryKind, Term};
use crate::error::{ParseResult, QueryError};
use crate::predicate::Vocabulary;

const QUERY_PREFIX: &str = "?-";
const TERMINATOR: char = '.';
const NEGATION: &str = "\\+";

/// Parse a query with the full default vocabulary.
///
/// # Examples
///
/// ```rust
/// use trace_query::{parse, QueryKind};
///
/// let query = parse("?- frame(1, Name, _, Status).").unwrap();
/// assert!(matches!(query.kind, QueryKind::Simple(_)));
///
/// let query = parse("?- status(X, error), \\+ param(X, handler, null).").unwrap();
/// assert_eq!(query.type_tag(), "compound");
/// ```
pub fn parse(input: &str) -> ParseResult<ParsedQuery> {
    QueryValidator::default().validate(input)
}

/// Validates query strings against a predicate vocabulary.
#[derive(Debug, Clone, Default)]
pub struct QueryValidator {
    vocabulary: Vocabulary,
}

impl QueryValidator {
    /// Creates a validator accepting only the given vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary this validator accepts.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Validates a raw query string into a [`ParsedQuery`].
    pub fn validate(&self, input: &str) -> ParseResult<ParsedQuery> {
        let input = input.trim();
        if input.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        if !input.starts_with(QUERY_PREFIX) {
            return Err(QueryError::MissingPrefix);
        }
        if !input.ends_with(TERMINATOR) {
            return Err(QueryError::MissingTerminator);
        }

        let body = input[QUERY_PREFIX.len()..input.len() - 1].trim();
        if body.is_empty() {
            return Err(QueryError::EmptyBody);
        }

        // A leading `\+` negates the whole body, commas included
        if let Some(rest) = body.strip_prefix(NEGATION) {
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(QueryError::EmptyNegation);
            }
            let goal = self
                .parse_goal(rest)
                .map_err(|e| QueryError::InNegation(Box::new(e)))?;
            return Ok(ParsedQuery::new(input, QueryKind::Negated(goal)));
        }

        let segments = split_conditions(body);
        let kind = if segments.len() > 1 {
            QueryKind::Compound(self.parse_compound(&segments)?)
        } else {
            QueryKind::Simple(self.parse_goal(body)?)
        };

        Ok(ParsedQuery::new(input, kind))
    }

    fn parse_compound(&self, segments: &[&str]) -> ParseResult<Conjunction> {
        let mut conditions = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let condition = self
                .parse_condition(segment.trim())
                .map_err(|e| QueryError::InCondition {
                    index: i + 1,
                    error: Box::new(e),
                })?;
            conditions.push(condition);
        }
        // split_conditions returned more than one segment
        Conjunction::new(conditions).ok_or(QueryError::EmptyBody)
    }

    fn parse_condition(&self, segment: &str) -> ParseResult<Condition> {
        if segment.is_empty() {
            return Err(QueryError::EmptyCondition);
        }
        match segment.strip_prefix(NEGATION) {
            Some(rest) => {
                let rest = rest.trim();
                if rest.is_empty() {
                    return Err(QueryError::EmptyNegation);
                }
                Ok(Condition::negated(self.parse_goal(rest)?))
            }
            None => Ok(Condition::positive(self.parse_goal(segment)?)),
        }
    }

    /// Validates a single goal such as `frame(1, X, Y, Z)`.
    fn parse_goal(&self, body: &str) -> ParseResult<Goal> {
        let (Some(open), true) = (body.find('('), body.contains(')')) else {
            return Err(QueryError::MissingParentheses);
        };

        let name = body[..open].trim();
        if name.is_empty() {
            return Err(QueryError::MissingPredicate);
        }
        if !is_identifier(name) {
            return Err(if name.starts_with(|c: char| c.is_uppercase()) {
                QueryError::UppercasePredicate(name.to_string())
            } else {
                QueryError::InvalidPredicate(name.to_string())
            });
        }
        let Some(predicate) = self.vocabulary.resolve(name) else {
            return Err(QueryError::UnknownPredicate {
                name: name.to_string(),
                known: self.vocabulary.names().into_iter().map(String::from).collect(),
            });
        };

        if body.matches('(').count() != 1 || body.matches(')').count() != 1 {
            return Err(QueryError::MismatchedParentheses);
        }
        let close = body.find(')').ok_or(QueryError::MismatchedParentheses)?;
        if close < open {
            return Err(QueryError::MismatchedParentheses);
        }
        let trailing = body[close + 1..].trim();
        if !trailing.is_empty() {
            return Err(QueryError::TrailingInput(trailing.to_string()));
        }

        let interior = body[open + 1..close].trim();
        if interior.is_empty() {
            return Err(QueryError::EmptyArguments(name.to_string()));
        }

        let mut args = Vec::new();
        for token in interior.split(',').map(str::trim) {
            if token.is_empty() {
                return Err(QueryError::EmptyArgument);
            }
            let term = lex_argument(token)
                .ok_or_else(|| QueryError::InvalidArgument(token.to_string()))?;
            args.push(term);
        }

        Ok(Goal::new(predicate, args))
    }
}

/// Splits a query body on commas that are not inside parentheses.
///
/// Empty segments are kept, including one after a trailing comma.
///
/// ```rust
/// use trace_query::split_conditions;
///
/// assert_eq!(
///     split_conditions("frame(1, X, Y, Z), allocated(1, W)"),
///     vec!["frame(1, X, Y, Z)", " allocated(1, W)"],
/// );
/// assert_eq!(split_conditions("status(1, X),"), vec!["status(1, X)", ""]);
/// ```
pub fn split_conditions(body: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments
}

// ============================================================================
// Lexical patterns
// ============================================================================

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `[a-z][A-Za-z0-9_]*`
fn atom(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        take_while(is_ident_char),
    ))(input)
}

/// `[A-Z_][A-Za-z0-9_]*`
fn variable(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

fn argument(input: &str) -> IResult<&str, Term> {
    alt((
        map(variable, Term::from_token),
        map(digit1, Term::from_token),
        map(atom, Term::from_token),
    ))(input)
}

fn is_identifier(name: &str) -> bool {
    all_consuming(atom)(name).is_ok()
}

fn lex_argument(token: &str) -> Option<Term> {
    all_consuming(argument)(token).ok().map(|(_, term)| term)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;
    use crate::predicate::Predicate;

    fn goal_of(query: &ParsedQuery) -> &Goal {
        match &query.kind {
            QueryKind::Simple(goal) | QueryKind::Negated(goal) => goal,
            QueryKind::Compound(_) => panic!("Expected a single goal"),
        }
    }

    mod simple_queries {
        use super::*;

        #[test]
        fn test_all_constants() {
            let query = parse("?- status(4, error).").unwrap();
            let goal = goal_of(&query);
            assert_eq!(goal.predicate, Predicate::Status);
            assert_eq!(
                goal.args,
                vec![Term::Constant(Value::Int(4)), Term::constant("error")]
            );
            assert_eq!(query.type_tag(), "simple");
        }

        #[test]
        fn test_variables_and_anonymous() {
            let query = parse("?- frame(X, _, _Ts, Status).").unwrap();
            let goal = goal_of(&query);
            assert_eq!(
                goal.args,
                vec![
                    Term::var("X"),
                    Term::Anonymous,
                    Term::var("_Ts"),
                    Term::var("Status"),
                ]
            );
        }

        #[test]
        fn test_whitespace_tolerated() {
            let query = parse("   ?-   calls( 1 ,  X )  .  ").unwrap();
            assert_eq!(goal_of(&query).args.len(), 2);
            assert_eq!(query.source, "?-   calls( 1 ,  X )  .");
        }

        #[test]
        fn test_no_space_after_prefix() {
            assert!(parse("?-calls(1,X).").is_ok());
        }

        #[test]
        fn test_null_constant() {
            let query = parse("?- param(F, handler, null).").unwrap();
            assert_eq!(goal_of(&query).args[2], Term::Constant(Value::Null));
        }

        #[test]
        fn test_arity_not_checked_by_validator() {
            // Arity mismatches are per-fact rejections during evaluation
            let query = parse("?- status(1).").unwrap();
            assert_eq!(goal_of(&query).arity(), 1);
        }
    }

    mod negated_queries {
        use super::*;

        #[test]
        fn test_negation() {
            let query = parse("?- \\+ status(99, error).").unwrap();
            assert!(matches!(query.kind, QueryKind::Negated(_)));
            assert_eq!(goal_of(&query).predicate, Predicate::Status);
        }

        #[test]
        fn test_negation_without_space() {
            let query = parse("?- \\+status(99, error).").unwrap();
            assert!(matches!(query.kind, QueryKind::Negated(_)));
        }

        #[test]
        fn test_empty_negation() {
            assert_eq!(parse("?- \\+ ."), Err(QueryError::EmptyNegation));
        }

        #[test]
        fn test_negated_goal_error_is_wrapped() {
            let err = parse("?- \\+ status 99.").unwrap_err();
            assert_eq!(
                err,
                QueryError::InNegation(Box::new(QueryError::MissingParentheses))
            );
            assert!(err.to_string().starts_with("Error in negated query"));
        }
    }

    mod compound_queries {
        use super::*;

        #[test]
        fn test_two_conditions() {
            let query = parse("?- frame(1, X, Y, Z), allocated(1, W).").unwrap();
            match &query.kind {
                QueryKind::Compound(conj) => {
                    assert_eq!(conj.len(), 2);
                    assert_eq!(conj.conditions()[0].goal.predicate, Predicate::Frame);
                    assert_eq!(conj.conditions()[1].goal.predicate, Predicate::Allocated);
                    assert!(!conj.conditions()[1].negated);
                    assert_eq!(conj.variables(), vec!["X", "Y", "Z", "W"]);
                }
                _ => panic!("Expected Compound"),
            }
        }

        #[test]
        fn test_negated_later_condition() {
            let query = parse("?- frame(F, _, _, _), \\+ calls(F, _).").unwrap();
            match &query.kind {
                QueryKind::Compound(conj) => assert!(conj.conditions()[1].negated),
                _ => panic!("Expected Compound"),
            }
        }

        #[test]
        fn test_leading_negation_covers_whole_body() {
            // The remainder holds two goals, so it fails as a single goal
            assert_eq!(
                parse("?- \\+ status(1, error), frame(1, _, _, _)."),
                Err(QueryError::InNegation(Box::new(
                    QueryError::MismatchedParentheses
                )))
            );
        }

        #[test]
        fn test_trailing_comma_is_empty_condition() {
            let err = parse("?- status(1, X),.").unwrap_err();
            assert_eq!(
                err,
                QueryError::InCondition {
                    index: 2,
                    error: Box::new(QueryError::EmptyCondition),
                }
            );
            assert_eq!(
                parse("?- status(1, X), , calls(X, Y)."),
                Err(QueryError::InCondition {
                    index: 2,
                    error: Box::new(QueryError::EmptyCondition),
                })
            );
        }

        #[test]
        fn test_error_in_condition_is_indexed() {
            let err = parse("?- frame(1, X, Y, Z), likes(X, Y).").unwrap_err();
            match &err {
                QueryError::InCondition { index, error } => {
                    assert_eq!(*index, 2);
                    assert!(matches!(**error, QueryError::UnknownPredicate { .. }));
                }
                _ => panic!("Expected InCondition, got {:?}", err),
            }
            assert!(err.to_string().starts_with("Error in condition 2:"));
        }

        #[test]
        fn test_three_conditions() {
            let query =
                parse("?- calls(A, B), calls(B, C), \\+ status(C, completed).").unwrap();
            match &query.kind {
                QueryKind::Compound(conj) => assert_eq!(conj.len(), 3),
                _ => panic!("Expected Compound"),
            }
        }
    }

    mod validation_order {
        use super::*;

        #[test]
        fn test_empty_input() {
            assert_eq!(parse(""), Err(QueryError::EmptyInput));
            assert_eq!(parse("   \t "), Err(QueryError::EmptyInput));
        }

        #[test]
        fn test_missing_prefix_before_terminator() {
            assert_eq!(parse("frame(1,2,3,4)"), Err(QueryError::MissingPrefix));
            assert_eq!(parse("frame(1,2,3,4)."), Err(QueryError::MissingPrefix));
        }

        #[test]
        fn test_missing_terminator() {
            assert_eq!(parse("?- frame(1, X, Y, Z)"), Err(QueryError::MissingTerminator));
        }

        #[test]
        fn test_empty_body() {
            assert_eq!(parse("?- ."), Err(QueryError::EmptyBody));
            assert_eq!(parse("?-."), Err(QueryError::EmptyBody));
        }

        #[test]
        fn test_missing_parentheses() {
            assert_eq!(parse("?- status."), Err(QueryError::MissingParentheses));
            assert_eq!(parse("?- status(1."), Err(QueryError::MissingParentheses));
        }

        #[test]
        fn test_missing_predicate() {
            assert_eq!(parse("?- (1, 2)."), Err(QueryError::MissingPredicate));
        }

        #[test]
        fn test_uppercase_predicate() {
            assert_eq!(
                parse("?- Frame(1, X, Y, Z)."),
                Err(QueryError::UppercasePredicate("Frame".to_string()))
            );
        }

        #[test]
        fn test_invalid_predicate_characters() {
            assert_eq!(
                parse("?- fr-ame(1)."),
                Err(QueryError::InvalidPredicate("fr-ame".to_string()))
            );
        }

        #[test]
        fn test_unknown_predicate_lists_vocabulary() {
            let err = parse("?- likes(X, Y).").unwrap_err();
            assert_eq!(
                err.hint(),
                "Valid predicates are: allocated, calls, frame, param, status."
            );
        }

        #[test]
        fn test_vocabulary_checked_before_parentheses() {
            // Unknown predicate is reported even though parentheses are also wrong
            let err = parse("?- likes((X)).").unwrap_err();
            assert!(matches!(err, QueryError::UnknownPredicate { .. }));
        }

        #[test]
        fn test_restricted_vocabulary() {
            let validator = QueryValidator::new(Vocabulary::new([Predicate::Status]));
            let err = validator.validate("?- frame(1, X, Y, Z).").unwrap_err();
            match err {
                QueryError::UnknownPredicate { name, known } => {
                    assert_eq!(name, "frame");
                    assert_eq!(known, vec!["status".to_string()]);
                }
                other => panic!("Expected UnknownPredicate, got {:?}", other),
            }
            assert!(validator.validate("?- status(1, X).").is_ok());
        }

        #[test]
        fn test_mismatched_parentheses() {
            assert_eq!(
                parse("?- frame((1), X, Y, Z)."),
                Err(QueryError::MismatchedParentheses)
            );
            assert_eq!(parse("?- status(1, X))."), Err(QueryError::MismatchedParentheses));
        }

        #[test]
        fn test_trailing_input() {
            assert_eq!(
                parse("?- status(1, X) extra."),
                Err(QueryError::TrailingInput("extra".to_string()))
            );
        }

        #[test]
        fn test_empty_arguments() {
            assert_eq!(
                parse("?- status()."),
                Err(QueryError::EmptyArguments("status".to_string()))
            );
        }

        #[test]
        fn test_empty_argument() {
            assert_eq!(parse("?- status(1, )."), Err(QueryError::EmptyArgument));
            assert_eq!(parse("?- status(, X)."), Err(QueryError::EmptyArgument));
        }

        #[test]
        fn test_invalid_argument() {
            assert_eq!(
                parse("?- status(1, 'error')."),
                Err(QueryError::InvalidArgument("'error'".to_string()))
            );
            assert_eq!(
                parse("?- allocated(1, 2.5)."),
                Err(QueryError::InvalidArgument("2.5".to_string()))
            );
            assert_eq!(
                parse("?- allocated(1, -5)."),
                Err(QueryError::InvalidArgument("-5".to_string()))
            );
        }

        #[test]
        fn test_nested_compound_term_rejected() {
            assert!(parse("?- param(1, f(x), Y).").is_err());
        }
    }

    mod splitting {
        use super::*;

        #[test]
        fn test_single_goal_not_split() {
            assert_eq!(split_conditions("frame(1, X, Y, Z)"), vec!["frame(1, X, Y, Z)"]);
        }

        #[test]
        fn test_top_level_commas_only() {
            assert_eq!(
                split_conditions("a(1, 2), b(3), c(4, 5, 6)"),
                vec!["a(1, 2)", " b(3)", " c(4, 5, 6)"]
            );
        }

        #[test]
        fn test_trailing_comma_keeps_empty_tail() {
            assert_eq!(split_conditions("a(1),"), vec!["a(1)", ""]);
            assert_eq!(split_conditions("a(1),,b(2)"), vec!["a(1)", "", "b(2)"]);
        }

        #[test]
        fn test_lexical_patterns() {
            assert!(is_identifier("frame"));
            assert!(is_identifier("call_2"));
            assert!(!is_identifier("2call"));
            assert!(!is_identifier("Frame"));
            assert_eq!(lex_argument("12abc"), None);
            assert_eq!(lex_argument("X1"), Some(Term::var("X1")));
        }
    }
}
