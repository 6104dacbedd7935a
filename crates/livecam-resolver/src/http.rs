use std::time::Duration;

use async_trait::async_trait;
use livecam_config::Config;
use livecam_protocols::{
    EmbedPayload, ManifestPayload, PageResolver, ProbeError, ProbeKind, ProbeOutcome,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Probes the embed and manifest extraction endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPageResolver {
    client: Client,
    embed_endpoint: String,
    manifest_endpoint: String,
    timeout: Duration,
}

impl HttpPageResolver {
    pub fn new(
        embed_endpoint: impl Into<String>,
        manifest_endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Unreachable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            embed_endpoint: embed_endpoint.into(),
            manifest_endpoint: manifest_endpoint.into(),
            timeout,
        })
    }

    /// Resolver for the configured backend, `None` when no base URL is set.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ProbeError> {
        let endpoints = &config.endpoints;
        match (endpoints.embed_url(), endpoints.manifest_url()) {
            (Some(embed), Some(manifest)) => {
                Self::new(embed, manifest, config.resolver.probe_timeout()).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self, kind: ProbeKind) -> &str {
        match kind {
            ProbeKind::Embed => &self.embed_endpoint,
            ProbeKind::Manifest => &self.manifest_endpoint,
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        kind: ProbeKind,
        page_url: &str,
    ) -> Result<T, ProbeError> {
        url::Url::parse(page_url)
            .map_err(|e| ProbeError::InvalidPageUrl(format!("{}: {}", page_url, e)))?;

        let response = self
            .client
            .get(self.endpoint(kind))
            .query(&[("url", page_url)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(probe = %kind, status = status.as_u16(), "Extraction endpoint answered");

        if !status.is_success() {
            return Err(ProbeError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProbeError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl PageResolver for HttpPageResolver {
    async fn probe_embed(&self, page_url: &str) -> ProbeOutcome<EmbedPayload> {
        match self.fetch::<EmbedPayload>(ProbeKind::Embed, page_url).await {
            Ok(payload) if payload.is_empty() => {
                ProbeOutcome::NotFound("no embed found on page".to_string())
            }
            Ok(payload) => ProbeOutcome::Found(payload),
            Err(e) => e.into(),
        }
    }

    async fn probe_manifest(&self, page_url: &str) -> ProbeOutcome<ManifestPayload> {
        match self.fetch::<ManifestPayload>(ProbeKind::Manifest, page_url).await {
            Ok(payload) => match payload.url() {
                Some(url) => ProbeOutcome::Found(ManifestPayload::new(url)),
                None => ProbeOutcome::NotFound("no manifest found on page".to_string()),
            },
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
