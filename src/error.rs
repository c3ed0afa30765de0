//! Error types for the HTTP layer and their status mapping.

use hyper::StatusCode;
use shico_tracker::{AggregateError, TrackError};
use thiserror::Error;

/// A query parameter that could not be coerced to its type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for '{name}': {value:?} is not {expected}")]
pub struct ParamError {
    pub name: String,
    pub value: String,
    pub expected: &'static str,
}

/// Errors that end a `/track` request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A typed query parameter is malformed.
    #[error(transparent)]
    Parameter(#[from] ParamError),

    /// The path carried no usable term.
    #[error("No terms given to track")]
    NoTerms,

    /// The monitor rejected the request.
    #[error(transparent)]
    Track(#[from] TrackError),

    /// The aggregator rejected the request.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// The blocking worker panicked or was cancelled.
    #[error("Tracking task failed: {0}")]
    Task(String),

    /// The response could not be encoded.
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServiceError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Parameter(_) | ServiceError::NoTerms => StatusCode::BAD_REQUEST,
            ServiceError::Track(TrackError::UnknownAlgorithm(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Aggregate(AggregateError::UnknownWeighting(_) | AggregateError::InvalidInterval) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Track(_)
            | ServiceError::Aggregate(AggregateError::UnparseableKey(_))
            | ServiceError::Task(_)
            | ServiceError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error code for the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Parameter(_) => "bad_parameter",
            ServiceError::NoTerms => "no_terms",
            ServiceError::Track(TrackError::UnknownAlgorithm(_)) => "unknown_algorithm",
            ServiceError::Track(_) => "tracking_failed",
            ServiceError::Aggregate(AggregateError::UnknownWeighting(_)) => "unknown_weighting",
            ServiceError::Aggregate(AggregateError::InvalidInterval) => "invalid_interval",
            ServiceError::Aggregate(AggregateError::UnparseableKey(_)) => "unparseable_key",
            ServiceError::Task(_) | ServiceError::Encode(_) => "internal",
        }
    }
}
