//! Playback link construction.
//!
//! Given the configured endpoints, produce the URLs a client should load:
//! proxied stream URLs, frame proxy URLs and embed URLs. Without a base URL
//! every method falls back to the original address.

use livecam_config::{EndpointsConfig, ResolverConfig};

/// Derived proxy and frame URLs for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackLinks {
    proxy_prefix: Option<String>,
    frame_endpoint: Option<String>,
    embed_template: String,
}

impl PlaybackLinks {
    /// Links with no proxy: every URL is used as is.
    pub fn direct(embed_template: impl Into<String>) -> Self {
        Self {
            proxy_prefix: None,
            frame_endpoint: None,
            embed_template: embed_template.into(),
        }
    }

    pub fn from_config(endpoints: &EndpointsConfig, resolver: &ResolverConfig) -> Self {
        Self {
            proxy_prefix: endpoints.proxy_prefix_url(),
            frame_endpoint: endpoints.frame_url(),
            embed_template: resolver.embed_template.clone(),
        }
    }

    /// Whether a proxy base is configured.
    pub fn is_proxied(&self) -> bool {
        self.proxy_prefix.is_some()
    }

    pub fn proxy_prefix(&self) -> Option<&str> {
        self.proxy_prefix.as_deref()
    }

    /// Playback URL for a stream, routed through the proxy in path mode.
    pub fn stream_url(&self, raw: &str) -> String {
        match &self.proxy_prefix {
            Some(prefix) => format!("{}/{}", prefix, raw),
            None => raw.to_string(),
        }
    }

    /// Playback URL for a stream, routed through the proxy in query mode.
    pub fn stream_query_url(&self, raw: &str) -> String {
        match &self.proxy_prefix {
            Some(prefix) => format!("{}?url={}", prefix, encode(raw)),
            None => raw.to_string(),
        }
    }

    /// Frame proxy URL for a page, if a proxy is configured.
    pub fn frame_url(&self, page_url: &str) -> Option<String> {
        self.frame_endpoint
            .as_ref()
            .map(|endpoint| format!("{}?url={}", endpoint, encode(page_url)))
    }

    /// Embed URL reconstructed from a bare identifier.
    pub fn embed_url(&self, id: &str) -> String {
        self.embed_template.replace("{id}", &encode(id))
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
