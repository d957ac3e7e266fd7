//! Error types for the fallible edges of the engine.
//!
//! Engine operations themselves never fail: a refused operation is a no-op
//! reported through `bool` / `Option`. Errors only come from parsing input that
//! crosses the crate boundary and from external collaborators.

use thiserror::Error;

/// Failure to read an exported canvas.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// Failure to load engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure reported by a text recognition collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("No text recognized")]
    Empty,
    #[error("Recognition unavailable: {0}")]
    Unavailable(String),
    #[error("Recognition failed: {0}")]
    Failed(String),
}
