//! Error types for template operations.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template source: {0}")]
    InvalidSource(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Unknown helper: {0}")]
    UnknownHelper(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
