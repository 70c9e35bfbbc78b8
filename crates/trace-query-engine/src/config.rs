//! Configuration types for the query engine.

use trace_query::Vocabulary;

/// Configuration for the query engine.
///
/// # Example
///
/// ```rust
/// use trace_query::{Predicate, Vocabulary};
/// use trace_query_engine::{EngineConfig, SignificanceConfig};
///
/// let config = EngineConfig::builder()
///     .with_vocabulary(Vocabulary::new([Predicate::Frame, Predicate::Status]))
///     .with_significance(SignificanceConfig {
///         pattern_threshold: 20,
///         ..SignificanceConfig::default()
///     })
///     .with_color(false)
///     .build();
/// assert!(!config.color);
/// assert!(config.cache_traversals);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Predicates queries may use.
    pub vocabulary: Vocabulary,
    /// Thresholds for significance detection.
    pub significance: SignificanceConfig,
    /// Colour significance banners with ANSI escapes.
    pub color: bool,
    /// Memoize call-chain traversals.
    pub cache_traversals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            significance: SignificanceConfig::default(),
            color: true,
            cache_traversals: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Restricts queries to the given predicates.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.config.vocabulary = vocabulary;
        self
    }

    /// Sets the significance thresholds.
    pub fn with_significance(mut self, significance: SignificanceConfig) -> Self {
        self.config.significance = significance;
        self
    }

    /// Enables or disables ANSI colour in banners.
    pub fn with_color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Enables or disables traversal memoization.
    pub fn with_traversal_cache(mut self, enabled: bool) -> Self {
        self.config.cache_traversals = enabled;
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

/// Thresholds used by the significance rules.
///
/// Each threshold is exclusive: a result is flagged only when it exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignificanceConfig {
    /// `calls` matches needed to flag recursion.
    pub recursion_threshold: usize,
    /// Bytes an `allocated` value must exceed to flag a memory anomaly.
    pub memory_threshold: u64,
    /// Matches needed to flag a general pattern.
    pub pattern_threshold: usize,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            recursion_threshold: 10,
            memory_threshold: 1_000_000,
            pattern_threshold: 5,
        }
    }
}
