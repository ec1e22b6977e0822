// crates/artwatch-core/src/error.rs

use std::fmt;

use thiserror::Error;

/// Workspace-wide error types for artwatch.
#[derive(Debug, Error)]
pub enum ArtwatchError {
    /// A backend or component is missing required configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Outbound request failed: timeout, connection error, or non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// Image payload could not be decoded or hashed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Result store read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Every enabled search backend failed for one lookup.
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// `Crawler::start` was called while a scan loop is already active.
    #[error("Crawler already running")]
    AlreadyRunning,

    /// Unknown artwork or finding id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more units of a batch scan failed. Every failure is retained.
    #[error("Batch scan failed for {} of {} artworks", .failures.len(), .total)]
    Batch {
        /// Number of artwork ids submitted.
        total: usize,
        /// Per-artwork failures in completion order.
        failures: Vec<BatchFailure>,
    },
}

impl ArtwatchError {
    /// True for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtwatchError::NotFound(_))
    }
}

impl From<serde_json::Error> for ArtwatchError {
    fn from(e: serde_json::Error) -> Self {
        ArtwatchError::Serialization(e.to_string())
    }
}

/// A single failed unit of work inside a batch scan.
#[derive(Debug)]
pub struct BatchFailure {
    pub artwork_id: String,
    pub error: ArtwatchError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.artwork_id, self.error)
    }
}
