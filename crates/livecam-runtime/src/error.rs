//! Runtime error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The session was cancelled before reaching a terminal state.
    #[error("Resolution cancelled")]
    Cancelled,

    #[error("Marker not found: {0}")]
    MarkerNotFound(String),

    #[error("Duplicate marker id: {0}")]
    DuplicateMarker(String),

    #[error("Invalid marker registry: {0}")]
    Registry(String),

    #[error("Resolver setup failed: {0}")]
    Setup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Registry(err.to_string())
    }
}
