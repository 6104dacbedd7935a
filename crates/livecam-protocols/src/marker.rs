//! Marker descriptors supplied by the presentation layer.

use serde::{Deserialize, Serialize};

/// A named location with candidate video-source hints.
///
/// Any combination of hints may be present. The order in which they are
/// tried is fixed by the resolution engine, never by field order here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Stable unique identifier.
    pub id: String,

    /// Display label.
    #[serde(default)]
    pub name: String,

    /// Scene coordinate. Opaque to the core.
    #[serde(default, alias = "pos", skip_serializing_if = "Option::is_none")]
    pub position: Option<serde_json::Value>,

    /// A playable manifest URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_stream_url: Option<String>,

    /// A hosted-video embed identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<String>,

    /// A public page believed to contain an embeddable player.
    #[serde(default, alias = "iframeUrl", skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,

    /// A page known to be frame-embeddable without extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_frame_url: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_direct_stream(mut self, url: impl Into<String>) -> Self {
        self.direct_stream_url = Some(url.into());
        self
    }

    pub fn with_embed_id(mut self, id: impl Into<String>) -> Self {
        self.embed_id = Some(id.into());
        self
    }

    pub fn with_page(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    pub fn with_fallback_frame(mut self, url: impl Into<String>) -> Self {
        self.fallback_frame_url = Some(url.into());
        self
    }

    pub fn direct_stream(&self) -> Option<&str> {
        present(&self.direct_stream_url)
    }

    pub fn embed(&self) -> Option<&str> {
        present(&self.embed_id)
    }

    pub fn page(&self) -> Option<&str> {
        present(&self.page_url)
    }

    pub fn fallback_frame(&self) -> Option<&str> {
        present(&self.fallback_frame_url)
    }

    /// True when no hint is usable.
    pub fn has_no_hints(&self) -> bool {
        self.direct_stream().is_none()
            && self.embed().is_none()
            && self.page().is_none()
            && self.fallback_frame().is_none()
    }
}

// Blank strings in a registry count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
