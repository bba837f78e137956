/// Error types for linetally.
///
/// Per-file scan failures are deliberately absent from this enum: a file that
/// cannot be opened or read collapses to a zero contribution (see
/// [`crate::tally::ScanOutcome`]) and never aborts a tally. `TallyError` only
/// covers failures that happen before any worker is dispatched, such as
/// loading configuration or expanding the input paths.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for tally setup operations
pub type TallyResult<T> = Result<T, TallyError>;

/// Errors that can occur while preparing a tally
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Missing search pattern")]
    MissingPattern,
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    IoError(#[source] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TallyError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_ignore_pattern(pattern: impl Into<String>, source: glob::PatternError) -> Self {
        Self::InvalidIgnorePattern {
            pattern: pattern.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an IO error on `path` to the most specific variant
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::path_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

impl From<config::ConfigError> for TallyError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
