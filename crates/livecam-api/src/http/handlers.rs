//! Resolution and session handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use livecam_protocols::{Marker, ResolutionAttempt, ResolutionState};
use livecam_runtime::SessionSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of a one-shot resolution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub marker_id: String,
    pub state: ResolutionState,
    pub attempts: Vec<ResolutionAttempt>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub marker_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    pub session_id: u64,
    pub marker_id: String,
}

#[derive(Debug, Serialize)]
pub struct FrameLoadedResponse {
    pub accepted: bool,
}

/// Run one resolution for the posted marker, outside the live session.
pub async fn resolve_marker(
    State(state): State<Arc<AppState>>,
    Json(marker): Json<Marker>,
) -> Result<Json<ResolveResponse>, ApiError> {
    if marker.id.trim().is_empty() {
        return Err(ApiError::BadRequest("marker id must not be empty".to_string()));
    }
    let marker_id = marker.id.clone();
    let resolution = state.engine().resolve(marker).await?;
    let (resolved, attempts) = resolution.into_parts();
    info!(marker_id = %marker_id, state = resolved.label(), "Resolved on request");

    Ok(Json(ResolveResponse {
        marker_id,
        state: resolved,
        attempts,
    }))
}

pub async fn list_markers(State(state): State<Arc<AppState>>) -> Json<Vec<Marker>> {
    Json(state.registry.iter().cloned().collect())
}

/// Select a registered marker, replacing the current session.
pub async fn select_marker(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, ApiError> {
    let marker = state.registry.require(&request.marker_id)?.clone();
    let handle = state.controller.select(marker);
    Ok(Json(SelectResponse {
        session_id: handle.session_id,
        marker_id: request.marker_id,
    }))
}

pub async fn current_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.snapshot())
}

pub async fn close_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    state.controller.close();
    Json(state.controller.snapshot())
}

/// Frame load report from the presentation layer. Stale ids are ignored.
pub async fn frame_loaded(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<u64>,
) -> Json<FrameLoadedResponse> {
    Json(FrameLoadedResponse {
        accepted: state.controller.frame_loaded(session_id),
    })
}
