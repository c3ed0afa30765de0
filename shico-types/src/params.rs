//! Tracking and aggregation parameters.

/// Algorithm used when none is requested.
pub const DEFAULT_ALGORITHM: &str = "inlinks";

/// Weighting function used when none is requested.
pub const DEFAULT_WEIGHTING: &str = "Gaussian";

/// Parameters consumed by the vocabulary monitor.
///
/// `start_key` / `end_key` bound the model keys visited (inclusive). The
/// `algorithm` is kept as the caller's string; the monitor decides whether it
/// knows it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrackParams {
    /// Maximum number of terms kept per model key.
    pub max_terms: usize,

    /// Number of nearest neighbours fetched per seed term.
    pub max_related_terms: usize,

    /// First model key to visit.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_key: Option<String>,

    /// Last model key to visit.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub end_key: Option<String>,

    /// Neighbours below this similarity are ignored.
    pub min_dist: f64,

    /// Multiplier applied to the weight of seed terms.
    pub word_boost: f64,

    /// Visit model keys in ascending order when true.
    pub forwards: bool,

    /// Weight links by similarity instead of counting them.
    pub sum_distances: bool,

    /// Name of the tracking algorithm.
    pub algorithm: String,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            max_terms: 10,
            max_related_terms: 10,
            start_key: None,
            end_key: None,
            min_dist: 0.0,
            word_boost: 1.0,
            forwards: true,
            sum_distances: false,
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

impl TrackParams {
    /// Create a builder starting from the defaults.
    pub fn builder() -> TrackParamsBuilder {
        TrackParamsBuilder::new()
    }
}

/// Parameters consumed by the vocabulary aggregator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AggregationParams {
    /// Name of the weighting function (`Gaussian`, `Linear`, `Uniform`).
    pub weighting_fn: String,

    /// Shape parameter of the weighting function.
    pub wf_param: f64,

    /// Width of each aggregation interval, in years.
    pub years_in_interval: usize,

    /// Number of words kept per interval.
    pub words_per_year: usize,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            weighting_fn: DEFAULT_WEIGHTING.to_string(),
            wf_param: 1.0,
            years_in_interval: 5,
            words_per_year: 10,
        }
    }
}

impl AggregationParams {
    /// Create a builder starting from the defaults.
    pub fn builder() -> AggregationParamsBuilder {
        AggregationParamsBuilder::new()
    }
}

/// Full per-request configuration: the monitor subset and the aggregation subset.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingConfig {
    pub track: TrackParams,
    pub aggregation: AggregationParams,
}

impl TrackingConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> TrackingConfigBuilder {
        TrackingConfigBuilder::default()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for `TrackParams`.
#[derive(Debug, Default)]
pub struct TrackParamsBuilder {
    params: TrackParams,
}

impl TrackParamsBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_terms(mut self, n: usize) -> Self {
        self.params.max_terms = n;
        self
    }

    pub fn max_related_terms(mut self, n: usize) -> Self {
        self.params.max_related_terms = n;
        self
    }

    pub fn start_key(mut self, key: impl Into<String>) -> Self {
        self.params.start_key = Some(key.into());
        self
    }

    pub fn end_key(mut self, key: impl Into<String>) -> Self {
        self.params.end_key = Some(key.into());
        self
    }

    pub fn min_dist(mut self, d: f64) -> Self {
        self.params.min_dist = d;
        self
    }

    pub fn word_boost(mut self, boost: f64) -> Self {
        self.params.word_boost = boost;
        self
    }

    pub fn forwards(mut self, forwards: bool) -> Self {
        self.params.forwards = forwards;
        self
    }

    pub fn sum_distances(mut self, sum: bool) -> Self {
        self.params.sum_distances = sum;
        self
    }

    pub fn algorithm(mut self, name: impl Into<String>) -> Self {
        self.params.algorithm = name.into();
        self
    }

    /// Build the parameters.
    pub fn build(self) -> TrackParams {
        self.params
    }
}

/// Builder for `AggregationParams`.
#[derive(Debug, Default)]
pub struct AggregationParamsBuilder {
    params: AggregationParams,
}

impl AggregationParamsBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weighting_fn(mut self, name: impl Into<String>) -> Self {
        self.params.weighting_fn = name.into();
        self
    }

    pub fn wf_param(mut self, p: f64) -> Self {
        self.params.wf_param = p;
        self
    }

    pub fn years_in_interval(mut self, n: usize) -> Self {
        self.params.years_in_interval = n;
        self
    }

    pub fn words_per_year(mut self, n: usize) -> Self {
        self.params.words_per_year = n;
        self
    }

    /// Build the parameters.
    pub fn build(self) -> AggregationParams {
        self.params
    }
}

/// Builder for `TrackingConfig`.
#[derive(Debug, Default)]
pub struct TrackingConfigBuilder {
    track: TrackParams,
    aggregation: AggregationParams,
}

impl TrackingConfigBuilder {
    /// Configure the monitor parameters using a closure.
    pub fn track<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TrackParamsBuilder) -> TrackParamsBuilder,
    {
        self.track = f(TrackParamsBuilder::new()).build();
        self
    }

    /// Configure the aggregation parameters using a closure.
    pub fn aggregation<F>(mut self, f: F) -> Self
    where
        F: FnOnce(AggregationParamsBuilder) -> AggregationParamsBuilder,
    {
        self.aggregation = f(AggregationParamsBuilder::new()).build();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TrackingConfig {
        TrackingConfig {
            track: self.track,
            aggregation: self.aggregation,
        }
    }
}
