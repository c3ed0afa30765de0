//! # shico-types
//!
//! Shared data model for the ShiCo concept-tracking service. This crate
//! defines the values that flow between the HTTP layer, the vocabulary
//! monitor and the vocabulary aggregator, so each of them can be built and
//! tested without depending on the others.
//!
//! ## Features
//!
//! - `serde`: JSON (and other formats) via serde. The server enables it;
//!   the tracker crate does not need it.
//!
//! ## Example
//!
//! ```rust
//! use shico_types::{TrackParams, TrackingConfig};
//!
//! let config = TrackingConfig::builder()
//!     .track(|t| t.max_terms(20).algorithm("outlinks"))
//!     .aggregation(|a| a.years_in_interval(10))
//!     .build();
//!
//! assert_eq!(config.track.max_terms, 20);
//! assert_eq!(config.track.max_related_terms, TrackParams::default().max_related_terms);
//! assert_eq!(config.aggregation.years_in_interval, 10);
//! ```

mod network;
mod params;
mod results;

pub use network::*;
pub use params::*;
pub use results::*;
