//! Health and liveness handlers.

use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, with part of the fallback chain unavailable.
    Degraded,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
}

/// Component health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    fn healthy(name: &str, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message,
        }
    }

    fn degraded(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
        }
    }
}

/// Start time for uptime calculation.
static START_TIME: OnceLock<SystemTime> = OnceLock::new();

/// Initialize start time (call on server start).
pub fn init_start_time() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime() -> u64 {
    START_TIME
        .get()
        .and_then(|start| start.elapsed().ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn overall(components: &[ComponentHealth]) -> HealthStatus {
    if components.iter().any(|c| c.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Component report. A missing extraction base only degrades the service:
/// static hints and frames still resolve.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine = state.engine();
    let mut components = vec![ComponentHealth::healthy("proxy", None)];

    components.push(if engine.has_backend() {
        ComponentHealth::healthy("resolver", None)
    } else {
        ComponentHealth::degraded("resolver", "no base_url configured, probes skipped")
    });

    components.push(if state.registry.is_empty() {
        ComponentHealth::degraded("markers", "registry is empty")
    } else {
        ComponentHealth::healthy("markers", Some(format!("count={}", state.registry.len())))
    });

    Json(HealthResponse {
        status: overall(&components),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: get_uptime(),
        components,
    })
}

/// Kubernetes-style liveness probe.
pub async fn liveness_probe() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}
