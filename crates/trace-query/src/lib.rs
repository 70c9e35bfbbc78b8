//! # trace-query
//!
//! Surface syntax for Prolog-style queries over execution-trace facts.
//!
//! This crate provides:
//! - **AST**: [`Predicate`], [`Term`], [`Value`], [`Goal`] and [`ParsedQuery`]
//! - **Validator**: [`QueryValidator`] checks a raw query string rule by rule
//!   and reports the first violation as a [`QueryError`] with a corrective hint
//!
//! Evaluation lives in the `trace-query-engine` crate.
//!
//! ## Usage
//!
//! ```rust
//! use trace_query::{parse, QueryError, QueryKind};
//!
//! // A simple query
//! let query = parse("?- status(X, error).").unwrap();
//! assert!(matches!(query.kind, QueryKind::Simple(_)));
//!
//! // A negated query
//! let query = parse("?- \\+ status(99, error).").unwrap();
//! assert!(matches!(query.kind, QueryKind::Negated(_)));
//!
//! // Validation failures carry a hint
//! let err = parse("frame(1, 2, 3, 4).").unwrap_err();
//! assert_eq!(err, QueryError::MissingPrefix);
//! assert!(err.hint().contains("?-"));
//! ```
//!
//! ## Syntax Quick Reference
//!
//! | Form | Meaning | Example |
//! |------|---------|---------|
//! | `?- g.` | Simple query | `?- frame(1, Name, _, _).` |
//! | `?- \+ g.` | Negation (absence) | `?- \+ status(3, error).` |
//! | `?- g1, g2.` | Conjunction | `?- calls(A, B), status(B, error).` |
//! | `X`, `_Tmp` | Variable | |
//! | `_` | Anonymous variable | |
//! | `init`, `42` | Atom, unsigned integer | |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod error;
mod parser;
mod predicate;

pub use ast::{Condition, Conjunction, Goal, ParsedQuery, QueryKind, Term, Value};
pub use error::{ParseResult, QueryError};
pub use parser::{parse, split_conditions, QueryValidator};
pub use predicate::{Predicate, Vocabulary};
