//! Backend extraction probe protocol.
//!
//! A page resolver answers two independent questions about a webcam page:
//! does it host a third-party video embed, and does it reference a playable
//! manifest. Ordering between the two is decided by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Which backend extraction a probe performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Embed,
    Manifest,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embed => write!(f, "embed"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The backend identified a source.
    Found(T),
    /// The backend answered, but found nothing usable.
    NotFound(String),
    /// The backend could not be consulted (connection, timeout, 5xx, bad payload).
    TransportError(String),
}

impl<T> ProbeOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProbeOutcome<U> {
        match self {
            Self::Found(value) => ProbeOutcome::Found(f(value)),
            Self::NotFound(reason) => ProbeOutcome::NotFound(reason),
            Self::TransportError(detail) => ProbeOutcome::TransportError(detail),
        }
    }
}

impl<T> From<ProbeError> for ProbeOutcome<T> {
    fn from(err: ProbeError) -> Self {
        if !err.is_not_found() {
            return ProbeOutcome::TransportError(err.to_string());
        }
        match err {
            ProbeError::Status { message, .. } if !message.trim().is_empty() => {
                ProbeOutcome::NotFound(message.trim().to_string())
            }
            other => ProbeOutcome::NotFound(other.to_string()),
        }
    }
}

/// Payload of the embed extraction endpoint: `{ id?, fullUrl? }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
}

impl EmbedPayload {
    /// Returned full URL, if any. Preferred over the bare identifier.
    pub fn full_url(&self) -> Option<&str> {
        self.full_url.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.full_url().is_none() && self.id().is_none()
    }
}

/// Payload of the manifest extraction endpoint: `{ url }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPayload {
    #[serde(default)]
    pub url: String,
}

impl ManifestPayload {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Trimmed manifest URL, `None` when blank.
    pub fn url(&self) -> Option<&str> {
        Some(self.url.trim()).filter(|u| !u.is_empty())
    }
}

/// Backend extraction probes for a webcam page.
///
/// Implementations must be idempotent and side-effect free, and must
/// return within a bounded interval; a hung backend is reported as
/// [`ProbeOutcome::TransportError`].
#[async_trait]
pub trait PageResolver: Send + Sync {
    /// Look for a hosted-video embed on the page.
    async fn probe_embed(&self, page_url: &str) -> ProbeOutcome<EmbedPayload>;

    /// Look for a directly playable manifest on the page.
    async fn probe_manifest(&self, page_url: &str) -> ProbeOutcome<ManifestPayload>;
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
