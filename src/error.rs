// src/error.rs
use thiserror::Error;

/// Failure kinds of the ingestion / filter pipeline.
///
/// None of these are recovered from inside the pipeline: there is no retry and
/// no fallback to a stale snapshot. The HTTP layer maps them to status codes.
#[derive(Debug, Error)]
pub enum QuakeError {
    /// The feed could not be reached, timed out or answered with a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The response body is not JSON or lacks the expected `features` list.
    #[error("format error: {0}")]
    Format(String),

    /// A feature is missing a required field.
    #[error("schema error: {0}")]
    Schema(String),

    /// The requested date window lies outside the configured bounds.
    #[error("range error: {0}")]
    Range(String),
}

impl From<reqwest::Error> for QuakeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            QuakeError::Format(e.to_string())
        } else {
            QuakeError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(e: serde_json::Error) -> Self {
        QuakeError::Format(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuakeError>;
