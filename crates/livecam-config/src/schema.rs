//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub frame: FrameConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Where the proxy and extraction endpoints are reachable.
///
/// `base_url` is the single switch between proxied and direct behaviour:
/// without it no URL is rewritten and no backend probe is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_proxy_path")]
    pub proxy_path: String,

    #[serde(default = "default_frame_path")]
    pub frame_path: String,

    #[serde(default = "default_embed_path")]
    pub embed_path: String,

    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            proxy_path: default_proxy_path(),
            frame_path: default_frame_path(),
            embed_path: default_embed_path(),
            manifest_path: default_manifest_path(),
        }
    }
}

impl EndpointsConfig {
    /// Configured base without trailing slashes, if any.
    pub fn base(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|b| b.trim().trim_end_matches('/'))
            .filter(|b| !b.is_empty())
    }

    /// Absolute proxy prefix, e.g. `https://relay.example/proxy`.
    pub fn proxy_prefix_url(&self) -> Option<String> {
        self.base().map(|b| format!("{}{}", b, self.proxy_path))
    }

    /// Absolute frame proxy endpoint.
    pub fn frame_url(&self) -> Option<String> {
        self.base().map(|b| format!("{}{}", b, self.frame_path))
    }

    /// Absolute embed extraction endpoint.
    pub fn embed_url(&self) -> Option<String> {
        self.base().map(|b| format!("{}{}", b, self.embed_path))
    }

    /// Absolute manifest extraction endpoint.
    pub fn manifest_url(&self) -> Option<String> {
        self.base().map(|b| format!("{}{}", b, self.manifest_path))
    }
}

fn default_proxy_path() -> String {
    "/proxy".to_string()
}

fn default_frame_path() -> String {
    "/frame".to_string()
}

fn default_embed_path() -> String {
    "/api/extract/embed".to_string()
}

fn default_manifest_path() -> String {
    "/api/extract/manifest".to_string()
}

/// Reverse proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_timeout")]
    pub timeout_secs: u64,

    /// Base for path-mode targets that are not absolute URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_origin: Option<String>,

    /// Hosts the proxy may reach. Empty allows any host.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_proxy_timeout(),
            upstream_origin: None,
            allowed_hosts: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_proxy_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("livecam/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Page resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Embed URL template; `{id}` is replaced with the embed identifier.
    #[serde(default = "default_embed_template")]
    pub embed_template: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
            embed_template: default_embed_template(),
        }
    }
}

impl ResolverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_embed_template() -> String {
    "https://www.youtube.com/embed/{id}?autoplay=1&mute=1".to_string()
}

/// Frame embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// How long a frame may take to report a load before it is flagged.
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period(),
        }
    }
}

impl FrameConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

fn default_grace_period() -> u64 {
    8000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory. Defaults to `~/.livecam/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Write a rolling log file next to console output.
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
