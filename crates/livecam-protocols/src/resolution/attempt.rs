//! Attempt log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Strategy;

/// Outcome of evaluating one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum AttemptResult {
    /// The strategy produced a playable payload.
    ResolvedWithPayload { payload: String },
    /// The strategy's hint was absent, or the backend found nothing.
    NotApplicable {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The backend could not be consulted.
    TransportError { detail: String },
}

impl AttemptResult {
    pub fn resolved(payload: impl Into<String>) -> Self {
        Self::ResolvedWithPayload {
            payload: payload.into(),
        }
    }

    pub fn skipped() -> Self {
        Self::NotApplicable { reason: None }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotApplicable {
            reason: Some(reason.into()),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::TransportError {
            detail: detail.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::ResolvedWithPayload { .. })
    }

    /// Diagnostic text worth surfacing when resolution fails.
    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            Self::TransportError { detail } => Some(detail),
            Self::NotApplicable { reason } => reason.as_deref(),
            Self::ResolvedWithPayload { .. } => None,
        }
    }
}

/// One evaluated strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAttempt {
    pub strategy: Strategy,
    #[serde(flatten)]
    pub result: AttemptResult,
    pub at: DateTime<Utc>,
}

impl ResolutionAttempt {
    pub fn new(strategy: Strategy, result: AttemptResult) -> Self {
        Self {
            strategy,
            result,
            at: Utc::now(),
        }
    }
}
