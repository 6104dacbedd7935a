//! Proxy error types.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use thiserror::Error;

/// Errors produced while routing or forwarding a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request does not carry a usable target URL.
    #[error("Invalid proxy target: {0}")]
    InvalidTarget(String),

    /// The upstream could not be reached or broke off.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned {status}")]
    UpstreamError {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },

    /// The proxy could not be set up from its configuration.
    #[error("Proxy setup failed: {0}")]
    Setup(String),
}

impl ProxyError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidTarget(message.into())
    }

    /// Status code this error is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::UpstreamUnreachable(format!("timed out: {}", err))
        } else {
            Self::UpstreamUnreachable(err.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::UpstreamError {
                content_type, body, ..
            } => {
                let mut response = (status, body).into_response();
                if let Some(value) = content_type.and_then(|ct| ct.parse().ok()) {
                    response.headers_mut().insert(header::CONTENT_TYPE, value);
                }
                response
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProxyError::invalid("empty target");
        assert_eq!(err.to_string(), "Invalid proxy target: empty target");

        let err = ProxyError::UpstreamUnreachable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::UpstreamUnreachable("x".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
        let err = ProxyError::UpstreamError {
            status: 404,
            content_type: None,
            body: Bytes::new(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProxyError::Setup("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_error_response_is_relayed() {
        let err = ProxyError::UpstreamError {
            status: 403,
            content_type: Some("text/plain".to_string()),
            body: Bytes::from_static(b"forbidden"),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn test_invalid_target_response() {
        let response = ProxyError::invalid("no url").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
