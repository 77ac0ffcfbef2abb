//! Error types for AWS operations.

use thiserror::Error;

/// Result type alias for AWS operations.
pub type AwsResult<T> = Result<T, AwsError>;

/// Errors that can occur while talking to AWS.
#[derive(Error, Debug)]
pub enum AwsError {
    #[error("aws {command} failed: {message}")]
    Cli { command: String, message: String },

    #[error("Unexpected aws output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
