//! The vocabulary monitor: follows seed terms through a series of models.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rayon::prelude::*;
use shico_types::{TermLinks, TrackParams, TrackingResult};

use crate::ranking::rank_terms;
use crate::{EmbeddingModel, ModelError, TrackError};

/// Anything that can track a term list through time.
///
/// The HTTP layer only depends on this trait, so it can be driven by the
/// model-backed [`VocabularyMonitor`] or by a fixed fake in tests.
pub trait VocabularyTracker: Send + Sync + fmt::Debug {
    /// Track `terms` through every model key selected by `params`.
    fn track_clouds(&self, terms: &[String], params: &TrackParams) -> Result<TrackingResult, TrackError>;
}

/// How seed terms are expanded into a term cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Weight candidates by the seed links pointing at them.
    Inlinks,
    /// Weight candidates by their own links back into the candidate set.
    Outlinks,
    /// Like `Inlinks`, but every key starts again from the original terms.
    NonAdaptive,
}

impl Algorithm {
    /// Whether the kept terms become the seeds for the next key.
    pub fn is_adaptive(self) -> bool {
        !matches!(self, Algorithm::NonAdaptive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Inlinks => "inlinks",
            Algorithm::Outlinks => "outlinks",
            Algorithm::NonAdaptive => "non-adaptive",
        }
    }
}

impl FromStr for Algorithm {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inlinks" => Ok(Algorithm::Inlinks),
            "outlinks" => Ok(Algorithm::Outlinks),
            "non-adaptive" | "nonadaptive" => Ok(Algorithm::NonAdaptive),
            _ => Err(TrackError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model-backed tracker holding one embedding model per time slice.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct VocabularyMonitor {
    models: BTreeMap<String, EmbeddingModel>,
}

impl VocabularyMonitor {
    /// Load every model file matching a glob pattern.
    ///
    /// Each model is keyed by its file stem. Files are loaded in parallel.
    pub fn load(pattern: &str, binary: bool) -> Result<Self, TrackError> {
        let mut paths = glob::glob(pattern)
            .map_err(|e| TrackError::Pattern(format!("{}: {}", pattern, e)))?
            .map(|entry| {
                entry.map_err(|e| ModelError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })
            })
            .collect::<Result<Vec<PathBuf>, ModelError>>()?;
        paths.sort();

        if paths.is_empty() {
            return Err(TrackError::NoModels(pattern.to_string()));
        }

        tracing::debug!(pattern, files = paths.len(), "Loading embedding models");

        let loaded = paths
            .par_iter()
            .map(|path| EmbeddingModel::load(path, binary).map(|model| (path.clone(), model)))
            .collect::<Result<Vec<_>, ModelError>>()?;

        let mut models = BTreeMap::new();
        for (path, model) in loaded {
            let key = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            tracing::debug!(
                key = %key,
                words = model.len(),
                dim = model.dim(),
                "Loaded model"
            );
            if models.insert(key.clone(), model).is_some() {
                tracing::warn!(key = %key, path = %path.display(), "Duplicate model key, keeping the later file");
            }
        }

        let monitor = Self { models };
        tracing::info!(
            models = monitor.len(),
            words = monitor.models.values().map(EmbeddingModel::len).sum::<usize>(),
            dim = monitor.models.values().next().map_or(0, EmbeddingModel::dim),
            first = monitor.keys().next().unwrap_or_default(),
            last = monitor.keys().last().unwrap_or_default(),
            "Vocabulary monitor ready"
        );
        Ok(monitor)
    }

    /// Build a monitor from already-loaded models.
    pub fn from_models<I, K>(models: I) -> Self
    where
        I: IntoIterator<Item = (K, EmbeddingModel)>,
        K: Into<String>,
    {
        Self {
            models: models.into_iter().map(|(k, m)| (k.into(), m)).collect(),
        }
    }

    /// Model keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when no model is loaded.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up the model for a key.
    pub fn model(&self, key: &str) -> Option<&EmbeddingModel> {
        self.models.get(key)
    }

    /// Keys inside the inclusive `[start, end]` range, in visiting order.
    fn keys_in_range<'a>(&'a self, params: &TrackParams) -> Vec<(&'a str, &'a EmbeddingModel)> {
        let start = params.start_key.as_deref();
        let end = params.end_key.as_deref();
        let mut keys: Vec<_> = self
            .models
            .iter()
            .filter(|(key, _)| start.map_or(true, |s| key.as_str() >= s))
            .filter(|(key, _)| end.map_or(true, |e| key.as_str() <= e))
            .map(|(key, model)| (key.as_str(), model))
            .collect();
        if !params.forwards {
            keys.reverse();
        }
        keys
    }
}

impl VocabularyTracker for VocabularyMonitor {
    fn track_clouds(&self, terms: &[String], params: &TrackParams) -> Result<TrackingResult, TrackError> {
        let algorithm: Algorithm = params.algorithm.parse()?;
        let original = dedup(terms.iter().cloned());
        let mut seeds = original.clone();
        let mut result = TrackingResult::new();

        for (key, model) in self.keys_in_range(params) {
            let used: Vec<String> = seeds.iter().filter(|s| model.contains(s)).cloned().collect();
            if used.is_empty() {
                tracing::debug!(key, "No seed terms in model vocabulary");
                result.insert(key, Vec::new(), Vec::new(), TermLinks::new());
                continue;
            }

            let (cloud, links) = track_step(model, &used, algorithm, params);
            tracing::trace!(key, seeds = used.len(), terms = cloud.len(), "Tracked key");

            if !algorithm.is_adaptive() {
                seeds = original.clone();
            } else if !cloud.is_empty() {
                seeds = cloud.iter().map(|(t, _)| t.clone()).collect();
            }
            result.insert(key, cloud, used, links);
        }

        Ok(result)
    }
}

/// Neighbours of `word` at or above the similarity threshold.
fn neighbours(model: &EmbeddingModel, word: &str, params: &TrackParams) -> Vec<(String, f64)> {
    model
        .most_similar(word, params.max_related_terms)
        .into_iter()
        .filter(|(_, sim)| *sim >= params.min_dist)
        .collect()
}

/// Build the term cloud for one key from the seeds found in its vocabulary.
fn track_step(
    model: &EmbeddingModel,
    seeds: &[String],
    algorithm: Algorithm,
    params: &TrackParams,
) -> (Vec<(String, f64)>, TermLinks) {
    let contribution = |sim: f64| if params.sum_distances { sim } else { 1.0 };

    let seed_links: TermLinks = seeds
        .par_iter()
        .map(|s| (s.clone(), neighbours(model, s, params)))
        .collect();

    let mut weights: HashMap<String, f64> = HashMap::new();
    let links = match algorithm {
        Algorithm::Inlinks | Algorithm::NonAdaptive => {
            for seed in seeds {
                *weights.entry(seed.clone()).or_default() += 1.0;
            }
            for targets in seed_links.values() {
                for (target, sim) in targets {
                    *weights.entry(target.clone()).or_default() += contribution(*sim);
                }
            }
            seed_links
        }
        Algorithm::Outlinks => {
            let candidates = dedup(
                seeds
                    .iter()
                    .cloned()
                    .chain(seed_links.values().flatten().map(|(t, _)| t.clone())),
            );
            let in_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();

            let candidate_links: TermLinks = candidates
                .par_iter()
                .map(|c| {
                    let inside = neighbours(model, c, params)
                        .into_iter()
                        .filter(|(t, _)| in_set.contains(t.as_str()))
                        .collect();
                    (c.clone(), inside)
                })
                .collect();

            for (source, targets) in &candidate_links {
                let total: f64 = targets.iter().map(|(_, sim)| contribution(*sim)).sum();
                *weights.entry(source.clone()).or_default() += total;
            }
            candidate_links
        }
    };

    for seed in seeds {
        if let Some(w) = weights.get_mut(seed) {
            *w *= params.word_boost;
        }
    }

    (rank_terms(weights, params.max_terms), links)
}

fn dedup<I: IntoIterator<Item = String>>(terms: I) -> Vec<String> {
    let mut seen = HashSet::new();
    terms.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model(entries: &[(&str, [f32; 3])]) -> EmbeddingModel {
        EmbeddingModel::from_entries(entries.iter().map(|(w, v)| (*w, v.to_vec()))).unwrap()
    }

    fn monitor() -> VocabularyMonitor {
        VocabularyMonitor::from_models(vec![
            (
                "1950_1954",
                model(&[
                    ("oorlog", [1.0, 0.0, 0.0]),
                    ("strijd", [0.9, 0.1, 0.0]),
                    ("vrede", [0.0, 1.0, 0.0]),
                    ("brood", [0.0, 0.0, 1.0]),
                ]),
            ),
            (
                "1955_1959",
                model(&[
                    ("oorlog", [1.0, 0.0, 0.0]),
                    ("strijd", [0.8, 0.2, 0.0]),
                    ("conflict", [0.7, 0.0, 0.3]),
                    ("brood", [0.0, 0.0, 1.0]),
                ]),
            ),
            (
                "1960_1964",
                model(&[
                    ("strijd", [1.0, 0.0, 0.0]),
                    ("conflict", [0.9, 0.0, 0.1]),
                    ("brood", [0.0, 1.0, 0.0]),
                ]),
            ),
        ])
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn algorithm_names_parse_case_insensitively() {
        assert_eq!("inlinks".parse::<Algorithm>().unwrap(), Algorithm::Inlinks);
        assert_eq!("OutLinks".parse::<Algorithm>().unwrap(), Algorithm::Outlinks);
        assert_eq!("non-adaptive".parse::<Algorithm>().unwrap(), Algorithm::NonAdaptive);
        assert!(matches!(
            "pagerank".parse::<Algorithm>(),
            Err(TrackError::UnknownAlgorithm(name)) if name == "pagerank"
        ));
    }

    #[test]
    fn unknown_algorithm_fails_the_request() {
        let params = TrackParams::builder().algorithm("bogus").build();
        let err = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap_err();
        assert!(matches!(err, TrackError::UnknownAlgorithm(_)));
    }

    #[test]
    fn inlinks_visits_every_key_and_adapts_seeds() {
        let params = TrackParams::builder().max_related_terms(1).max_terms(2).build();
        let result = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.seeds["1950_1954"], terms(&["oorlog"]));
        let first: Vec<&str> = result.results["1950_1954"].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(first, vec!["oorlog", "strijd"]);
        assert_eq!(result.links["1950_1954"]["oorlog"][0].0, "strijd");

        // "oorlog" is gone from the last model, but "strijd" was adopted as a seed.
        assert_eq!(result.seeds["1960_1964"], terms(&["strijd"]));
        assert!(!result.results["1960_1964"].is_empty());
    }

    #[test]
    fn non_adaptive_restarts_from_original_terms() {
        let params = TrackParams::builder()
            .max_related_terms(1)
            .algorithm("non-adaptive")
            .build();
        let result = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap();

        assert_eq!(result.seeds["1955_1959"], terms(&["oorlog"]));
        assert!(result.seeds["1960_1964"].is_empty());
        assert!(result.results["1960_1964"].is_empty());
    }

    #[test]
    fn word_boost_and_sum_distances_shape_weights() {
        let params = TrackParams::builder()
            .max_related_terms(1)
            .word_boost(3.0)
            .sum_distances(true)
            .end_key("1950_1954")
            .build();
        let result = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap();
        let cloud = &result.results["1950_1954"];

        assert_eq!(cloud[0], ("oorlog".to_string(), 3.0));
        let sim = result.links["1950_1954"]["oorlog"][0].1;
        assert!((cloud[1].1 - sim).abs() < 1e-9);
        assert!(sim < 1.0);
    }

    #[test]
    fn min_dist_filters_links() {
        let params = TrackParams::builder().min_dist(0.999).end_key("1950_1954").build();
        let result = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap();

        assert!(result.links["1950_1954"]["oorlog"].is_empty());
        assert_eq!(result.results["1950_1954"], vec![("oorlog".to_string(), 1.0)]);
    }

    #[test]
    fn outlinks_weights_candidates_by_links_into_the_set() {
        let params = TrackParams::builder()
            .max_related_terms(1)
            .algorithm("outlinks")
            .end_key("1950_1954")
            .build();
        let result = monitor().track_clouds(&terms(&["oorlog"]), &params).unwrap();
        let links = &result.links["1950_1954"];

        // Candidate links replace the seed links.
        assert!(links.contains_key("strijd"));
        assert_eq!(links["strijd"][0].0, "oorlog");
        let cloud: Vec<&str> = result.results["1950_1954"].iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(cloud, vec!["oorlog", "strijd"]);
    }

    #[test]
    fn key_range_is_inclusive_and_respects_direction() {
        let params = TrackParams::builder()
            .start_key("1955_1959")
            .end_key("1960_1964")
            .forwards(false)
            .max_related_terms(1)
            .build();
        let result = monitor().track_clouds(&terms(&["strijd"]), &params).unwrap();

        let keys: Vec<&String> = result.results.keys().collect();
        assert_eq!(keys, vec!["1955_1959", "1960_1964"]);
        // Backwards: 1960 was visited first, then its cloud seeded 1955.
        assert_eq!(result.seeds["1960_1964"], terms(&["strijd"]));
        assert!(result.seeds["1955_1959"].contains(&"strijd".to_string()));
    }

    #[test]
    fn unknown_terms_yield_empty_clouds() {
        let result = monitor()
            .track_clouds(&terms(&["onbekend"]), &TrackParams::default())
            .unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.results.values().all(|cloud| cloud.is_empty()));
    }

    #[test]
    fn load_keys_models_by_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        for key in ["1951_1952", "1950_1951"] {
            let mut file = std::fs::File::create(dir.path().join(format!("{}.w2v", key))).unwrap();
            writeln!(file, "2 2\na 1.0 0.0\nb 0.0 1.0").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = format!("{}/*.w2v", dir.path().display());
        let monitor = VocabularyMonitor::load(&pattern, false).unwrap();

        let keys: Vec<&str> = monitor.keys().collect();
        assert_eq!(keys, vec!["1950_1951", "1951_1952"]);
        assert_eq!(monitor.model("1950_1951").unwrap().len(), 2);
    }

    #[test]
    fn load_without_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.w2v", dir.path().display());
        assert!(matches!(
            VocabularyMonitor::load(&pattern, true),
            Err(TrackError::NoModels(_))
        ));
        assert!(matches!(
            VocabularyMonitor::load("[", true),
            Err(TrackError::Pattern(_))
        ));
    }

    #[test]
    fn load_propagates_model_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1950.w2v"), "garbage").unwrap();
        let pattern = format!("{}/*.w2v", dir.path().display());
        assert!(matches!(
            VocabularyMonitor::load(&pattern, false),
            Err(TrackError::Model(ModelError::Header { .. }))
        ));
    }
}
