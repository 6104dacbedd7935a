//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use livecam_config::Config;
use livecam_extract::Extractor;
use livecam_proxy::ProxyState;
use livecam_runtime::{MarkerRegistry, ResolutionEngine, SessionController};

use crate::error::ApiError;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub registry: MarkerRegistry,
    pub controller: SessionController,
    pub proxy: Arc<ProxyState>,
    pub extractor: Arc<Extractor>,
    start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, registry: MarkerRegistry) -> Result<Self, ApiError> {
        let controller = SessionController::from_config(&config)?;
        let proxy = Arc::new(ProxyState::from_config(&config)?);
        let extractor = Arc::new(Extractor::from_config(&config)?);
        Ok(Self {
            config,
            registry,
            controller,
            proxy,
            extractor,
            start_time: Instant::now(),
        })
    }

    pub fn engine(&self) -> &ResolutionEngine {
        self.controller.engine()
    }

    /// Get uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("markers", &self.registry.len())
            .field("session", &self.controller.current_session())
            .finish_non_exhaustive()
    }
}
