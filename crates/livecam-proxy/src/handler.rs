//! Axum handlers for the stream proxy and the frame proxy.
//!
//! ```text
//! GET <proxy_path>?url=<encoded>   - query mode
//! GET <proxy_path>/<target-url>    - path mode
//! GET <frame_path>?url=<encoded>   - page for sandboxed embedding
//! ```

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Uri},
    response::Response,
    routing::get,
};
use livecam_config::Config;
use tracing::debug;

use crate::error::ProxyError;
use crate::forward::Forwarder;
use crate::route::{ProxyRoute, RouteRules};

/// Shared state of the proxy endpoints.
#[derive(Debug, Clone)]
pub struct ProxyState {
    forwarder: Forwarder,
    proxy_rules: RouteRules,
    frame_rules: RouteRules,
}

impl ProxyState {
    pub fn new(forwarder: Forwarder, proxy_rules: RouteRules, frame_rules: RouteRules) -> Self {
        Self {
            forwarder,
            proxy_rules,
            frame_rules,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ProxyError> {
        Ok(Self {
            forwarder: Forwarder::new(&config.proxy)?,
            proxy_rules: RouteRules::from_config(&config.endpoints.proxy_path, &config.proxy)?,
            frame_rules: RouteRules::from_config(&config.endpoints.frame_path, &config.proxy)?,
        })
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }
}

/// Mount the proxy and frame endpoints at their configured prefixes.
pub fn routes(state: Arc<ProxyState>) -> Router {
    let proxy = state.proxy_rules.prefix().to_string();
    let frame = state.frame_rules.prefix().to_string();

    Router::new()
        .route(&proxy, get(proxy_handler))
        .route(&format!("{}/", proxy), get(proxy_handler))
        .route(&format!("{}/{{*target}}", proxy), get(proxy_handler))
        .route(&frame, get(frame_handler))
        .with_state(state)
}

async fn proxy_handler(
    State(state): State<Arc<ProxyState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let route = ProxyRoute::parse(uri.path(), uri.query(), &state.proxy_rules)
        .inspect_err(|e| debug!(path = %uri, error = %e, "Rejected proxy request"))?;
    debug!(upstream = %route.target(), mode = ?route.mode(), "Proxying");
    state.forwarder.relay(&route, &headers).await
}

async fn frame_handler(
    State(state): State<Arc<ProxyState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let route = ProxyRoute::parse(uri.path(), uri.query(), &state.frame_rules)
        .inspect_err(|e| debug!(path = %uri, error = %e, "Rejected frame request"))?;
    debug!(upstream = %route.target(), "Framing page");
    state.forwarder.frame(&route, &headers).await
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
