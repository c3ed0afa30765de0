//! # shico-server
//!
//! HTTP service that tracks how the vocabulary around a set of seed terms
//! shifts over time, using one word-embedding model per time slice.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        GET /track/{terms}                          │
//! │  ┌─────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐  │
//! │  │ params  │──▶│   monitor    │──▶│  aggregator  │──▶│  format  │  │
//! │  │ (query) │   │(track_clouds)│   │ (intervals)  │   │  (JSON)  │  │
//! │  └─────────┘   └──────┬───────┘   └──────────────┘   └──────────┘  │
//! │                       │                                            │
//! │                       ▼                                            │
//! │              word2vec models, one per time slice                   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`params`]**: query string to [`TrackingConfig`](shico_types::TrackingConfig)
//! - **[`server`]**: hyper HTTP/1 server, routing, CORS and error statuses
//! - **[`format`]**: `stream` and `networks` response shaping
//! - **[`config`]**: layered service configuration (defaults, file, env, flags)
//!
//! The monitor and aggregator live in `shico-tracker`; the shared data model
//! lives in `shico-types`.
//!
//! ## Usage
//!
//! ```bash
//! # Serve binary models from the default location on 0.0.0.0:5000
//! shico-server
//!
//! # Text models, custom glob and port
//! shico-server --non-binary --files 'models/*.txt' --listen 127.0.0.1:8080
//!
//! curl 'http://localhost:5000/track/oorlog,vrede?maxTerms=15&agg.yearsInInterval=10'
//! ```
//!
//! ## Embedding the server
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use shico_server::config::NetworkMode;
//! use shico_server::server::{serve, AppState};
//! use shico_tracker::VocabularyMonitor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let monitor = VocabularyMonitor::load("models/*.w2v", true)?;
//!     let state = AppState::new(Arc::new(monitor), NetworkMode::Placeholder);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     serve(listener, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod params;
pub mod server;

pub use crate::config::{NetworkMode, ServiceConfig};
pub use error::{ParamError, ServiceError};
pub use format::{tuples_as_dict, year_tuples_as_dict, yearly_network, TrackResponse};
pub use params::parse_query;
pub use server::{serve, AppState};
