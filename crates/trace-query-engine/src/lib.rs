//! # trace-query-engine
//!
//! Logic-query engine over execution-trace facts.
//!
//! This crate bridges the [`trace-query`](trace_query) validator and an
//! in-memory [`FactStore`] built from stack-frame [`Record`]s. Queries are
//! answered by flat unification (no rules, no clause resolution), with
//! support for conjunctions and negation as absence.
//!
//! ## Key Features
//!
//! - **Flat unification** - anonymous, named and repeated variables
//! - **Conjunctions** - left-deep join threading bindings left to right
//! - **Negation** - `\+ goal` succeeds iff nothing matches
//! - **Call-graph traversal** - memoized BFS over the `calls` relation
//! - **Discovery detection** - ordered heuristic rules with text banners
//!
//! ## Quick Start
//!
//! ```rust
//! use trace_query_engine::{FactStore, FailureScenario, QueryEngine, RecordGenerator};
//!
//! // Simulate a trace that ends in a null dereference
//! let records = RecordGenerator::new(FailureScenario::NullPointer, Some(42)).generate(10);
//! let store = FactStore::from_records(&records).unwrap();
//!
//! let engine = QueryEngine::new(&store);
//! let result = engine.run("?- status(X, error).").into_result().unwrap();
//! assert!(result.is_significant);
//! println!("{}", result.output);
//! ```
//!
//! ## With Configuration
//!
//! ```rust
//! use trace_query::{Predicate, Vocabulary};
//! use trace_query_engine::{EngineConfig, FactStore, QueryEngine, SignificanceConfig};
//!
//! let config = EngineConfig::builder()
//!     .with_vocabulary(Vocabulary::new([Predicate::Frame, Predicate::Calls]))
//!     .with_significance(SignificanceConfig {
//!         recursion_threshold: 20,
//!         ..SignificanceConfig::default()
//!     })
//!     .with_color(false)
//!     .build();
//!
//! let store = FactStore::new();
//! let engine = QueryEngine::with_config(&store, config);
//! assert!(!engine.run("?- status(X, error).").is_valid());
//! ```
//!
//! ## Facts
//!
//! | Predicate | Arity | Derived from |
//! |-----------|-------|--------------|
//! | `frame(Id, Name, Timestamp, Status)` | 4 | every record |
//! | `calls(Caller, Callee)` | 2 | records with a caller |
//! | `allocated(Id, Bytes)` | 2 | every record |
//! | `param(Id, Name, Value)` | 3 | every parameter |
//! | `status(Id, Status)` | 2 | every record |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    trace-query-engine                        │
//! │                                                              │
//! │  QueryEngine                                                 │
//! │  ├── validate query string → ParsedQuery (trace-query)      │
//! │  ├── evaluate goals / conjunctions (QueryEvaluator)         │
//! │  ├── classify significance (SignificanceDetector)           │
//! │  └── render text (ResultFormatter) → QueryResponse          │
//! │                                                              │
//! │  QueryEvaluator                                              │
//! │  ├── match facts (matcher)                                  │
//! │  └── traverse calls (CallGraphTraverser + TraversalCache)   │
//! │                                                              │
//! │  Sources:                                                    │
//! │  ├── RecordGenerator - simulated traces with one anomaly    │
//! │  └── FactStore       - predicate-indexed facts              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod config;
mod engine;
mod error;
mod evaluator;
mod formatter;
mod generator;
mod matcher;
mod record;
mod result;
mod significance;
mod store;
mod traits;
mod traverser;

// Public re-exports
pub use cache::{CacheStats, TraversalCache};
pub use config::{EngineConfig, EngineConfigBuilder, SignificanceConfig};
pub use engine::QueryEngine;
pub use error::{EngineError, EngineResult};
pub use evaluator::QueryEvaluator;
pub use formatter::ResultFormatter;
pub use generator::{FailureScenario, RecordGenerator, SYSTEM_FUNCTIONS};
pub use matcher::{match_fact, match_goal, merge, substitute, Binding};
pub use record::{FrameId, FrameStatus, Record};
pub use result::{ExecutionStats, QueryResponse, QueryResult, ValidationResult};
pub use significance::{DiscoveryKind, Observation, SignificanceDetector, SignificanceRule};
pub use store::{Fact, FactStore};
pub use traits::CallRelation;
pub use traverser::{CallGraphTraverser, Direction, RelationshipInfo};

// Re-export commonly used types from the parser for convenience
pub use trace_query::{ParsedQuery, Predicate, QueryError, Value, Vocabulary};
