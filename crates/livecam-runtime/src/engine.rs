//! Async driver for a single resolution.

use std::sync::Arc;
use std::time::Duration;

use livecam_config::Config;
use livecam_protocols::{Marker, PageResolver, ProbeError, ProbeKind, ResolutionState};
use livecam_proxy::PlaybackLinks;
use livecam_resolver::HttpPageResolver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ResolveError;
use crate::machine::{ProbeResult, Resolution, Step};

/// Runs resolutions against an optional page resolver.
///
/// Without a resolver the backend probes are skipped entirely.
#[derive(Clone)]
pub struct ResolutionEngine {
    links: PlaybackLinks,
    resolver: Option<Arc<dyn PageResolver>>,
    probe_timeout: Duration,
}

impl ResolutionEngine {
    pub fn new(
        links: PlaybackLinks,
        resolver: Option<Arc<dyn PageResolver>>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            links,
            resolver,
            probe_timeout,
        }
    }

    /// Engine for the configured endpoints. A base URL enables both the
    /// proxy links and the HTTP page resolver.
    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        let links = PlaybackLinks::from_config(&config.endpoints, &config.resolver);
        let resolver = HttpPageResolver::from_config(config)
            .map_err(|e| ResolveError::Setup(e.to_string()))?
            .map(|r| Arc::new(r) as Arc<dyn PageResolver>);
        Ok(Self::new(links, resolver, config.resolver.probe_timeout()))
    }

    pub fn links(&self) -> &PlaybackLinks {
        &self.links
    }

    pub fn has_backend(&self) -> bool {
        self.resolver.is_some()
    }

    /// A fresh resolution for `marker`, still idle.
    pub fn start(&self, marker: Marker) -> Resolution {
        Resolution::new(marker, self.links.clone(), self.has_backend())
    }

    /// Drive a resolution to its terminal state.
    ///
    /// `publish` sees every state the resolution passes through. Cancelling
    /// `token` abandons the outstanding probe and returns
    /// [`ResolveError::Cancelled`].
    pub async fn run<F>(
        &self,
        marker: Marker,
        token: &CancellationToken,
        mut publish: F,
    ) -> Result<Resolution, ResolveError>
    where
        F: FnMut(&ResolutionState),
    {
        let mut resolution = self.start(marker);

        loop {
            let step = resolution.advance();
            publish(resolution.state());

            let (kind, page_url) = match step {
                Step::Settled(state) => {
                    info!(
                        marker_id = %resolution.marker().id,
                        state = state.label(),
                        attempts = resolution.attempts().len(),
                        "Resolution settled"
                    );
                    return Ok(resolution);
                }
                Step::Probe { kind, page_url } => (kind, page_url),
            };

            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!(marker_id = %resolution.marker().id, probe = %kind, "Probe cancelled");
                    return Err(ResolveError::Cancelled);
                }
                result = self.probe(kind, &page_url) => result,
            };
            resolution.apply(result);
        }
    }

    /// Resolve without outside cancellation.
    pub async fn resolve(&self, marker: Marker) -> Result<Resolution, ResolveError> {
        self.run(marker, &CancellationToken::new(), |_| {}).await
    }

    async fn probe(&self, kind: ProbeKind, page_url: &str) -> ProbeResult {
        let Some(resolver) = &self.resolver else {
            return ProbeResult::transport_error(kind, "no page resolver configured");
        };

        let probe = async {
            match kind {
                ProbeKind::Embed => ProbeResult::Embed(resolver.probe_embed(page_url).await),
                ProbeKind::Manifest => {
                    ProbeResult::Manifest(resolver.probe_manifest(page_url).await)
                }
            }
        };

        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(result) => result,
            Err(_) => ProbeResult::transport_error(
                kind,
                ProbeError::Timeout(self.probe_timeout).to_string(),
            ),
        }
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("links", &self.links)
            .field("backend", &self.has_backend())
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
