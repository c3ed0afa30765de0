//! Aggregation of per-key term clouds into intervals of years.

use std::collections::{BTreeMap, HashMap};

use shico_types::{AggregationParams, AggregationResult, YearlyTerms};

use crate::ranking::rank_terms;
use crate::AggregateError;

/// Weight given to a model key by its distance (in years) to the interval centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightingFn {
    Gaussian { sigma: f64 },
    Linear { width: f64 },
    Uniform,
}

impl WeightingFn {
    /// Resolve a weighting function by name (case-insensitive).
    ///
    /// `param` is the Gaussian sigma, or the fraction of the interval over
    /// which the linear weight falls to zero.
    pub fn from_name(name: &str, param: f64, years_in_interval: usize) -> Result<Self, AggregateError> {
        match name.to_ascii_lowercase().as_str() {
            "gaussian" => Ok(WeightingFn::Gaussian { sigma: param }),
            "linear" => Ok(WeightingFn::Linear {
                width: param * years_in_interval as f64,
            }),
            "uniform" => Ok(WeightingFn::Uniform),
            _ => Err(AggregateError::UnknownWeighting(name.to_string())),
        }
    }

    /// Weight at distance `d` from the centre.
    pub fn weight(&self, d: f64) -> f64 {
        match *self {
            WeightingFn::Gaussian { sigma } if sigma > 0.0 => (-(d * d) / (2.0 * sigma * sigma)).exp(),
            WeightingFn::Linear { width } if width > 0.0 => (1.0 - d.abs() / width).max(0.0),
            WeightingFn::Gaussian { .. } | WeightingFn::Linear { .. } => {
                if d == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            WeightingFn::Uniform => 1.0,
        }
    }
}

/// The year carried by a model key: its first run of ASCII digits.
///
/// ```
/// use shico_tracker::key_year;
///
/// assert_eq!(key_year("1950_1959"), Some(1950));
/// assert_eq!(key_year("model-1987"), Some(1987));
/// assert_eq!(key_year("latest"), None);
/// ```
pub fn key_year(key: &str) -> Option<i64> {
    let start = key.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &key[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Buckets per-key term clouds into fixed-width intervals of years.
///
/// Built per request from the aggregation parameters and then discarded.
#[derive(Debug, Clone)]
pub struct VocabularyAggregator {
    weighting: WeightingFn,
    /// Interval width in years; widths beyond `i64::MAX` saturate.
    width: i64,
    words_per_year: usize,
}

impl VocabularyAggregator {
    pub fn new(params: &AggregationParams) -> Result<Self, AggregateError> {
        if params.years_in_interval == 0 {
            return Err(AggregateError::InvalidInterval);
        }
        let weighting = WeightingFn::from_name(&params.weighting_fn, params.wf_param, params.years_in_interval)?;
        Ok(Self {
            weighting,
            width: i64::try_from(params.years_in_interval).unwrap_or(i64::MAX),
            words_per_year: params.words_per_year,
        })
    }

    /// Aggregate per-key clouds into per-interval clouds.
    ///
    /// Each interval is labelled with its first member key; `metadata` lists
    /// the member keys of every interval.
    pub fn aggregate(&self, results: &YearlyTerms) -> Result<AggregationResult, AggregateError> {
        let mut keyed = results
            .keys()
            .map(|key| {
                key_year(key)
                    .map(|year| (year, key.as_str()))
                    .ok_or_else(|| AggregateError::UnparseableKey(key.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        keyed.sort();

        let Some(&(first_year, _)) = keyed.first() else {
            return Ok(AggregationResult::new());
        };

        let width = self.width;
        let mut intervals: BTreeMap<i64, Vec<(i64, &str)>> = BTreeMap::new();
        for (year, key) in keyed {
            let slot = (year - first_year) / width;
            intervals.entry(slot).or_default().push((year, key));
        }

        let mut aggregated = AggregationResult::new();
        for (slot, members) in intervals {
            let start = first_year + slot * width;
            let centre = start as f64 + (width as f64 - 1.0) / 2.0;

            let mut weights: HashMap<String, f64> = HashMap::new();
            for &(year, key) in &members {
                let factor = self.weighting.weight(year as f64 - centre);
                for (term, weight) in &results[key] {
                    *weights.entry(term.clone()).or_default() += factor * weight;
                }
            }

            let label = members[0].1.to_string();
            tracing::trace!(label = %label, members = members.len(), "Aggregated interval");
            aggregated.metadata.insert(
                label.clone(),
                members.iter().map(|(_, key)| key.to_string()).collect(),
            );
            aggregated
                .results
                .insert(label, rank_terms(weights, self.words_per_year));
        }

        Ok(aggregated)
    }
}
