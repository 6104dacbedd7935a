//! Upstream forwarding.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use livecam_config::ProxyConfig;
use reqwest::{Client, redirect};
use tracing::{debug, warn};
use url::Url;

use crate::error::ProxyError;
use crate::route::{AddressingMode, ProxyRoute};

/// Client headers passed on to the upstream. Everything else, including
/// `Origin`, `Referer` and `Cookie`, stays behind.
pub static FORWARDED_REQUEST_HEADERS: [header::HeaderName; 4] = [
    header::RANGE,
    header::ACCEPT,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
];

/// Upstream headers relayed to the client.
pub static RELAYED_RESPONSE_HEADERS: [header::HeaderName; 9] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::CACHE_CONTROL,
    header::ETAG,
    header::LAST_MODIFIED,
    header::CONTENT_ENCODING,
    header::EXPIRES,
];

/// Forwards parsed proxy routes to their upstream.
///
/// Stream requests never follow redirects: the redirect is handed back to the
/// player pointing into the proxy, so relative segment URIs resolve against
/// the final manifest location. Frame requests follow them and base the page
/// on the final URL.
#[derive(Debug, Clone)]
pub struct Forwarder {
    stream_client: Client,
    frame_client: Client,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let build = |policy: redirect::Policy| {
            Client::builder()
                .timeout(config.timeout())
                .user_agent(config.user_agent.as_str())
                .redirect(policy)
                .build()
                .map_err(|e| ProxyError::Setup(e.to_string()))
        };
        Ok(Self {
            stream_client: build(redirect::Policy::none())?,
            frame_client: build(redirect::Policy::limited(10))?,
        })
    }

    /// Send the upstream request. Success, 304 and redirects come back as
    /// the response; other statuses as [`ProxyError::UpstreamError`]
    /// carrying the upstream body.
    async fn send(
        &self,
        client: &Client,
        route: &ProxyRoute,
        incoming: &HeaderMap,
    ) -> Result<reqwest::Response, ProxyError> {
        let mut request = client.get(route.target().clone());
        for name in &FORWARDED_REQUEST_HEADERS {
            if let Some(value) = incoming.get(name) {
                request = request.header(name.clone(), value.clone());
            }
        }

        let response = request.send().await.map_err(|e| {
            warn!(upstream = %route.target(), error = %e, "Upstream unreachable");
            ProxyError::from(e)
        })?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            debug!(upstream = %route.target(), status = status.as_u16(), "Upstream responded");
            return Ok(response);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await;
        Err(upstream_error(route.target(), status, content_type, body))
    }

    /// Forward and stream the upstream body back with the relayed headers.
    pub async fn relay(
        &self,
        route: &ProxyRoute,
        incoming: &HeaderMap,
    ) -> Result<Response, ProxyError> {
        let upstream = self.send(&self.stream_client, route, incoming).await?;
        if let Some(location) = proxied_location(route, &upstream) {
            debug!(upstream = %route.target(), location = ?location, "Relaying redirect");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = upstream.status();
            let headers = response.headers_mut();
            *headers = relayed_headers(upstream.headers());
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(header::LOCATION, location);
            return Ok(response);
        }
        Ok(stream_response(upstream))
    }

    /// Forward a page for embedding in a sandboxed frame.
    ///
    /// HTML gets a `<base href>` pointing at the final URL after redirects so
    /// relative resources load from the origin. No upstream policy header is
    /// relayed.
    pub async fn frame(
        &self,
        route: &ProxyRoute,
        incoming: &HeaderMap,
    ) -> Result<Response, ProxyError> {
        let upstream = self.send(&self.frame_client, route, incoming).await?;
        let is_html = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));

        if !is_html {
            return Ok(stream_response(upstream));
        }

        let status = upstream.status();
        let base = upstream.url().clone();
        if base != *route.target() {
            debug!(upstream = %route.target(), base = %base, "Frame target redirected");
        }
        let html = upstream.text().await?;
        let html = inject_base(&html, base.as_str());

        let mut response = Response::new(Body::from(Bytes::from(html)));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        Ok(response)
    }
}

fn stream_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = relayed_headers(upstream.headers());
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Error for a non-success upstream status. A body that cannot be read is a
/// connectivity failure.
fn upstream_error(
    target: &Url,
    status: StatusCode,
    content_type: Option<String>,
    body: Result<Bytes, reqwest::Error>,
) -> ProxyError {
    match body {
        Ok(body) => {
            warn!(upstream = %target, status = status.as_u16(), "Upstream error");
            ProxyError::UpstreamError {
                status: status.as_u16(),
                content_type,
                body,
            }
        }
        Err(e) => {
            warn!(
                upstream = %target,
                status = status.as_u16(),
                error = %e,
                "Upstream error body unreadable"
            );
            ProxyError::UpstreamUnreachable(e.to_string())
        }
    }
}

/// `Location` of an upstream redirect, rewritten to go back through the
/// proxy in the same addressing mode as the request.
fn proxied_location(route: &ProxyRoute, upstream: &reqwest::Response) -> Option<HeaderValue> {
    let status = upstream.status();
    if !status.is_redirection() || status == StatusCode::NOT_MODIFIED {
        return None;
    }
    let location = upstream.headers().get(header::LOCATION)?.to_str().ok()?;
    let next = route.target().join(location).ok()?;
    HeaderValue::from_str(&proxy_url(route, &next)).ok()
}

/// `next` addressed through the prefix `route` came in on.
fn proxy_url(route: &ProxyRoute, next: &Url) -> String {
    let mut next = next.clone();
    next.set_fragment(None);
    match route.mode() {
        AddressingMode::Path => format!("{}/{}", route.prefix(), next),
        AddressingMode::Query => {
            let encoded: String =
                url::form_urlencoded::byte_serialize(next.as_str().as_bytes()).collect();
            format!("{}?url={}", route.prefix(), encoded)
        }
    }
}

/// Keep only the media-relevant upstream headers.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in &RELAYED_RESPONSE_HEADERS {
        for value in upstream.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Insert `<base href="...">` right after the opening `<head>` tag, or at the
/// start of the document when there is none.
pub fn inject_base(html: &str, href: &str) -> String {
    let tag = format!(
        "<base href=\"{}\">",
        href.replace('&', "&amp;").replace('"', "&quot;")
    );

    let lower = html.to_ascii_lowercase();
    let head_end = lower
        .match_indices("<head")
        .find(|(idx, _)| {
            lower[idx + 5..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_ascii_whitespace())
        })
        .and_then(|(idx, _)| lower[idx..].find('>').map(|end| idx + end + 1));

    match head_end {
        Some(pos) => format!("{}{}{}", &html[..pos], tag, &html[pos..]),
        None => format!("{}{}", tag, html),
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
