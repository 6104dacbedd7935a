//! Extraction error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("Page returned {0}")]
    PageStatus(u16),

    #[error("{0}")]
    NotFound(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ExtractError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Fetch(_) | Self::PageStatus(_) => StatusCode::BAD_GATEWAY,
            Self::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
