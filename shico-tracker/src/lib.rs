//! # shico-tracker
//!
//! The two collaborators behind the ShiCo `/track` endpoint:
//!
//! - [`VocabularyMonitor`] loads one word-embedding model per time slice and
//!   follows a set of seed terms through them, producing a term cloud, the
//!   seeds used and the links followed for every model key.
//! - [`VocabularyAggregator`] buckets those per-key clouds into intervals of
//!   years, weighting each key by its distance to the interval centre.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shico_tracker::{VocabularyAggregator, VocabularyMonitor, VocabularyTracker};
//! use shico_types::{AggregationParams, TrackParams};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = VocabularyMonitor::load("word2vecModels/195[0-1]_????.w2v", true)?;
//!
//!     let terms = vec!["oorlog".to_string()];
//!     let tracked = monitor.track_clouds(&terms, &TrackParams::default())?;
//!
//!     let aggregator = VocabularyAggregator::new(&AggregationParams::default())?;
//!     let aggregated = aggregator.aggregate(&tracked.results)?;
//!
//!     println!("{} intervals", aggregated.len());
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod error;
pub mod model;
pub mod monitor;
mod ranking;

pub use aggregator::{key_year, VocabularyAggregator, WeightingFn};
pub use error::{AggregateError, ModelError, TrackError};
pub use model::EmbeddingModel;
pub use monitor::{Algorithm, VocabularyMonitor, VocabularyTracker};

// Re-export types for convenience
pub use shico_types::{AggregationParams, AggregationResult, TrackParams, TrackingResult};
