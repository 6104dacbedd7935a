//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{
    close_session, current_session, frame_loaded, list_markers, resolve_marker, select_marker,
};
use crate::http::monitoring;
use crate::state::AppState;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// /api
///   POST   /api/resolve                     - Resolve a posted marker once
///   GET    /api/markers                     - Registered markers
///   POST   /api/session/select              - Select a marker by id
///   GET    /api/session                     - Current session snapshot
///   DELETE /api/session                     - Close the overlay
///   POST   /api/session/{id}/frame-loaded   - Frame load signal
///
/// <proxy_path>, <frame_path>                - Stream and frame proxy
/// <embed_path>, <manifest_path>             - Extraction endpoints
///
/// /health                                   - Component health
/// /livez                                    - Liveness probe
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let endpoints = &state.config.endpoints;

    let api_routes = Router::new()
        .route("/api/resolve", post(resolve_marker))
        .route("/api/markers", get(list_markers))
        .route("/api/session", get(current_session).delete(close_session))
        .route("/api/session/select", post(select_marker))
        .route("/api/session/{id}/frame-loaded", post(frame_loaded))
        .with_state(state.clone());

    let monitoring_routes = Router::new()
        .route("/health", get(monitoring::health_check))
        .with_state(state.clone());

    let liveness_route = Router::new().route("/livez", get(monitoring::liveness_probe));

    // Flat paths: the extraction endpoints live under /api as well.
    Router::new()
        .merge(api_routes)
        .merge(livecam_proxy::routes(state.proxy.clone()))
        .merge(livecam_extract::routes(
            state.extractor.clone(),
            &endpoints.embed_path,
            &endpoints.manifest_path,
        ))
        .merge(monitoring_routes)
        .merge(liveness_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
