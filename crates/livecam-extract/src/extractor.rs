//! Page fetching and extraction.

use livecam_config::Config;
use livecam_protocols::{EmbedPayload, ManifestPayload};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::ExtractError;
use crate::scan;

/// Fetches webcam pages and scans them for playable sources.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
}

impl Extractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(config.proxy.timeout())
            .user_agent(config.proxy.user_agent.as_str())
            .build()
            .map_err(|e| ExtractError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }

    async fn fetch_page(&self, page_url: &str) -> Result<(Url, String), ExtractError> {
        let url = Url::parse(page_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| ExtractError::InvalidUrl(page_url.to_string()))?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/html,*/*")
            .send()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::PageStatus(status.as_u16()));
        }

        // Relative manifests resolve against the final URL after redirects.
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;
        debug!(page = %final_url, bytes = body.len(), "Fetched page");
        Ok((final_url, body))
    }

    /// Look for a hosted-video embed on the page.
    pub async fn embed(&self, page_url: &str) -> Result<EmbedPayload, ExtractError> {
        let (_, html) = self.fetch_page(page_url).await?;
        let payload = scan::find_embed(&html)
            .ok_or_else(|| ExtractError::NotFound("no embed found on page".to_string()))?;
        info!(page = %page_url, id = ?payload.id(), "Embed extracted");
        Ok(payload)
    }

    /// Look for an HLS manifest on the page.
    pub async fn manifest(&self, page_url: &str) -> Result<ManifestPayload, ExtractError> {
        let (url, html) = self.fetch_page(page_url).await?;
        let manifest = scan::find_manifest(&html, &url)
            .ok_or_else(|| ExtractError::NotFound("no manifest found on page".to_string()))?;
        info!(page = %page_url, manifest = %manifest, "Manifest extracted");
        Ok(ManifestPayload::new(manifest))
    }
}
