//! Backend probe errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Extraction backend unreachable: {0}")]
    Unreachable(String),

    #[error("Extraction backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid extraction response: {0}")]
    Decode(String),

    #[error("Invalid page URL: {0}")]
    InvalidPageUrl(String),
}

impl ProbeError {
    /// Whether the backend gave a definitive "nothing here" answer rather than failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}
