//! Results produced by the monitor and the aggregator.

use std::collections::BTreeMap;

/// Ordered `(term, weight)` pairs, highest weight first.
pub type TermWeights = Vec<(String, f64)>;

/// Term clouds keyed by model key (or aggregation interval label).
pub type YearlyTerms = BTreeMap<String, TermWeights>;

/// Seed term to its ordered `(neighbour, similarity)` links.
pub type TermLinks = BTreeMap<String, Vec<(String, f64)>>;

/// Output of the vocabulary monitor.
///
/// All three maps share the same key set: one entry per model key visited.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingResult {
    /// Term cloud per model key.
    pub results: YearlyTerms,

    /// Seed terms actually used for each model key.
    pub seeds: BTreeMap<String, Vec<String>>,

    /// Links followed for each model key.
    pub links: BTreeMap<String, TermLinks>,
}

impl TrackingResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of model keys visited.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when no model key was visited.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Record the outcome for one model key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        terms: TermWeights,
        seeds: Vec<String>,
        links: TermLinks,
    ) {
        let key = key.into();
        self.results.insert(key.clone(), terms);
        self.seeds.insert(key.clone(), seeds);
        self.links.insert(key, links);
    }
}

/// Output of the vocabulary aggregator.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregationResult {
    /// Term cloud per interval label.
    pub results: YearlyTerms,

    /// Interval label to the model keys it covers, in order.
    pub metadata: BTreeMap<String, Vec<String>>,
}

impl AggregationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when there are no intervals.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
