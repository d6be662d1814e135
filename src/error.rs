//! Error taxonomy for the monitor

use std::path::PathBuf;

use thiserror::Error;

use crate::models::IndicatorId;

/// Numeric precondition failures. None of these raise an alert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("log undefined for non-positive value {0}")]
    InvalidValue(f64),

    #[error("insufficient history: need {needed} points, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("weight count {weights} does not match indicator count {indicators}")]
    WeightCountMismatch { indicators: usize, weights: usize },

    #[error("weights sum to zero")]
    ZeroWeightSum,

    #[error("no inputs to average")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for indicator {indicator_id}")]
    Status { indicator_id: IndicatorId, status: u16 },

    #[error("invalid payload for indicator {indicator_id}: {reason}")]
    Payload {
        indicator_id: IndicatorId,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Rate limiting, transient server errors and transport failures are
    /// worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("state I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Reasons a composite signal is not computed in a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositeSkip {
    #[error("missing dependency {0}")]
    MissingDependency(IndicatorId),

    #[error("no dependency has a new datapoint")]
    NoNewData,

    /// Dependency was first seen this run and has no baseline yet.
    #[error("dependency {0} was seeded this run")]
    Seeding(IndicatorId),

    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("environment file error: {0}")]
    Env(String),
}
