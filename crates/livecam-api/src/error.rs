//! API error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use livecam_extract::ExtractError;
use livecam_proxy::ProxyError;
use livecam_runtime::ResolveError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Proxy setup failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Extractor setup failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Resolve(ResolveError::MarkerNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Resolve(ResolveError::Cancelled) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
