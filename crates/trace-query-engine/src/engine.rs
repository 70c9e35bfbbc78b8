//! The query pipeline: validate, evaluate, classify, render.

use std::time::Instant;

use tracing::debug;

use trace_query::{ParsedQuery, QueryKind, QueryValidator};

use crate::cache::CacheStats;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::evaluator::QueryEvaluator;
use crate::formatter::ResultFormatter;
use crate::record::FrameId;
use crate::result::{ExecutionStats, QueryResponse, QueryResult, ValidationResult};
use crate::significance::SignificanceDetector;
use crate::store::FactStore;
use crate::traverser::{Direction, RelationshipInfo};

/// Main query engine.
///
/// Bridges the validator (`trace-query`) and a [`FactStore`]. One engine
/// serves one session; its traversal cache lives as long as it does.
///
/// # Example
///
/// ```rust
/// use trace_query_engine::{FactStore, FrameStatus, QueryEngine, QueryResponse, Record};
///
/// let store = FactStore::from_records(&[
///     Record::new(1, "init", None, 1000, 2048, FrameStatus::Active),
/// ]).unwrap();
/// let engine = QueryEngine::new(&store);
///
/// match engine.run("?- frame(1, Name, _, _).") {
///     QueryResponse::Evaluated(result) => assert!(result.output.contains("Name = init")),
///     QueryResponse::Invalid(v) => panic!("{}", v.error_message),
/// }
///
/// let invalid = engine.run("frame(1, 2, 3, 4).");
/// assert!(!invalid.is_valid());
/// ```
#[derive(Debug)]
pub struct QueryEngine<'a> {
    store: &'a FactStore,
    config: EngineConfig,
    validator: QueryValidator,
    evaluator: QueryEvaluator<'a>,
    detector: SignificanceDetector,
    formatter: ResultFormatter,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine with default configuration.
    pub fn new(store: &'a FactStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates an engine with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trace_query_engine::{EngineConfig, FactStore, QueryEngine};
    ///
    /// let store = FactStore::new();
    /// let config = EngineConfig::builder().with_color(false).build();
    /// let engine = QueryEngine::with_config(&store, config);
    /// assert!(!engine.config().color);
    /// ```
    pub fn with_config(store: &'a FactStore, config: EngineConfig) -> Self {
        Self {
            store,
            validator: QueryValidator::new(config.vocabulary.clone()),
            evaluator: QueryEvaluator::with_cache(store, config.cache_traversals),
            detector: SignificanceDetector::new(&config.significance),
            formatter: ResultFormatter::new(config.vocabulary.clone(), config.color),
            config,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The store being queried.
    pub fn store(&self) -> &'a FactStore {
        self.store
    }

    /// The underlying evaluator.
    pub fn evaluator(&self) -> &QueryEvaluator<'a> {
        &self.evaluator
    }

    /// Parses a query against the configured vocabulary.
    pub fn parse(&self, input: &str) -> EngineResult<ParsedQuery> {
        Ok(self.validator.validate(input)?)
    }

    /// Validates a query, reporting failure as data.
    pub fn validate(&self, input: &str) -> ValidationResult {
        let source = input.trim();
        match self.validator.validate(input) {
            Ok(parsed) => ValidationResult::valid(source, parsed),
            Err(error) => {
                debug!(query = source, error = %error, "query rejected");
                ValidationResult::from_error(source, &error)
            }
        }
    }

    /// Validates and, if valid, evaluates a query.
    ///
    /// Never panics and never returns an error: syntax problems come back as
    /// [`QueryResponse::Invalid`].
    pub fn run(&self, input: &str) -> QueryResponse {
        let validation = self.validate(input);
        if let Some(parsed) = &validation.parsed {
            return QueryResponse::Evaluated(self.evaluate(parsed));
        }
        QueryResponse::Invalid(validation)
    }

    /// Evaluates an already validated query.
    pub fn evaluate(&self, query: &ParsedQuery) -> QueryResult {
        let start = Instant::now();

        let (bindings, discovery, output) = match &query.kind {
            QueryKind::Simple(goal) => {
                let bindings = self.evaluator.evaluate_simple(goal);
                let discovery = self.detector.classify(goal, &bindings);
                let output = self
                    .formatter
                    .format_simple(goal, &bindings, self.store, discovery);
                (bindings, discovery, output)
            }
            QueryKind::Negated(goal) => {
                let bindings = self.evaluator.evaluate_negated(goal);
                let output = self
                    .formatter
                    .format_negated(goal, !bindings.is_empty(), self.store);
                (bindings, None, output)
            }
            QueryKind::Compound(conjunction) => {
                let bindings = self.evaluator.evaluate_compound(conjunction);
                let output = self
                    .formatter
                    .format_compound(conjunction, &bindings, self.store);
                (bindings, None, output)
            }
        };

        let facts_scanned = query
            .predicates()
            .into_iter()
            .map(|p| self.store.facts(p).len())
            .sum();
        let stats = ExecutionStats::new(start.elapsed(), facts_scanned);

        debug!(
            query = %query,
            kind = query.type_tag(),
            results = bindings.len(),
            discovery = ?discovery,
            "query evaluated"
        );

        QueryResult {
            variables: query.variables().into_iter().map(String::from).collect(),
            is_significant: discovery.is_some(),
            discovery,
            bindings,
            output,
            stats,
        }
    }

    /// Transitive callees or callers of `frame`.
    pub fn call_chain(&self, frame: FrameId, direction: Direction) -> Vec<FrameId> {
        self.evaluator.call_chain(frame, direction)
    }

    /// Shortest caller → callee path from `from` to `to`.
    pub fn call_path(&self, from: FrameId, to: FrameId) -> Option<Vec<FrameId>> {
        self.evaluator.call_path(from, to)
    }

    /// Direct and transitive relationships of `frame`.
    pub fn relationship_info(&self, frame: FrameId) -> RelationshipInfo {
        self.evaluator.relationship_info(frame)
    }

    /// Traversal cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.evaluator.cache_stats()
    }
}
