//! Proxy target extraction.
//!
//! A single parser turns an inbound path and query into the upstream URL it
//! addresses. Path-mode remainders are taken literally:
//!
//! | Remainder                 | Target                                      |
//! |---------------------------|---------------------------------------------|
//! | `https://host/p?q`        | used as is                                  |
//! | `https:/host/p`           | collapsed slash restored                    |
//! | `//host/p`                | scheme of the upstream origin, else `https` |
//! | `host/p` (no origin)      | `https://host/p`                            |
//! | `p/seg.ts` (with origin)  | joined against the upstream origin          |

use livecam_config::ProxyConfig;
use url::Url;

use crate::error::ProxyError;

/// How the target URL was carried by the inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// `<prefix>/<url>`
    Path,
    /// `<prefix>?url=<encoded-url>`
    Query,
}

/// Prefix and target restrictions for one mounted proxy endpoint.
#[derive(Debug, Clone)]
pub struct RouteRules {
    prefix: String,
    upstream_origin: Option<Url>,
    allowed_hosts: Vec<String>,
}

impl RouteRules {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            upstream_origin: None,
            allowed_hosts: Vec::new(),
        }
    }

    /// Base for relative path-mode targets.
    pub fn with_upstream_origin(mut self, mut origin: Url) -> Self {
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        self.upstream_origin = Some(origin);
        self
    }

    /// Restrict targets to these hosts and their subdomains.
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    /// Build the rules for `prefix` from the proxy section of the config.
    pub fn from_config(prefix: &str, config: &ProxyConfig) -> Result<Self, ProxyError> {
        let mut rules = Self::new(prefix).with_allowed_hosts(&config.allowed_hosts);
        if let Some(origin) = &config.upstream_origin {
            let origin = Url::parse(origin)
                .map_err(|e| ProxyError::Setup(format!("upstream_origin {}: {}", origin, e)))?;
            rules = rules.with_upstream_origin(origin);
        }
        Ok(rules)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn default_scheme(&self) -> &str {
        self.upstream_origin
            .as_ref()
            .map(|o| o.scheme())
            .unwrap_or("https")
    }

    fn host_allowed(&self, host: &str) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            host == *allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

/// A parsed proxy request. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    incoming_path: String,
    prefix: String,
    target: Url,
    mode: AddressingMode,
}

impl ProxyRoute {
    /// Extract the upstream target from an inbound path and query.
    pub fn parse(path: &str, query: Option<&str>, rules: &RouteRules) -> Result<Self, ProxyError> {
        let prefix = rules.prefix();
        let incoming_path = match query {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };

        let rest = path
            .strip_prefix(prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| ProxyError::invalid(format!("{} is outside {}", path, prefix)))?;

        let query_target = if rest.is_empty() || rest == "/" {
            query.and_then(url_param)
        } else {
            None
        };

        let (mode, target) = match query_target {
            Some(value) => (AddressingMode::Query, parse_absolute(&value)?),
            None => {
                let mut remainder = rest.strip_prefix('/').unwrap_or(rest).to_string();
                if remainder.is_empty() {
                    return Err(ProxyError::invalid("missing target url"));
                }
                if let Some(q) = query {
                    remainder.push('?');
                    remainder.push_str(q);
                }
                (AddressingMode::Path, resolve_remainder(&remainder, rules)?)
            }
        };

        let host = target.host_str().unwrap_or_default();
        if !rules.host_allowed(host) {
            return Err(ProxyError::invalid(format!("host {} is not allowed", host)));
        }

        Ok(Self {
            incoming_path,
            prefix: prefix.to_string(),
            target,
            mode,
        })
    }

    pub fn incoming_path(&self) -> &str {
        &self.incoming_path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }
}

fn url_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_absolute(value: &str) -> Result<Url, ProxyError> {
    let url = Url::parse(value).map_err(|e| ProxyError::invalid(format!("{}: {}", value, e)))?;
    check_http(url)
}

fn resolve_remainder(remainder: &str, rules: &RouteRules) -> Result<Url, ProxyError> {
    if let Some(rest) = remainder.strip_prefix("//") {
        return parse_absolute(&format!("{}://{}", rules.default_scheme(), rest));
    }

    if let Some((scheme, rest)) = split_scheme(remainder) {
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ProxyError::invalid(format!("unsupported scheme {}", scheme)));
        }
        return parse_absolute(&format!("{}://{}", scheme, rest.trim_start_matches('/')));
    }

    match &rules.upstream_origin {
        Some(origin) => {
            let url = origin
                .join(remainder)
                .map_err(|e| ProxyError::invalid(format!("{}: {}", remainder, e)))?;
            check_http(url)
        }
        None => parse_absolute(&format!("https://{}", remainder)),
    }
}

/// Split `scheme:/rest`, requiring a slash after the colon so `host:8080/p`
/// is not mistaken for a scheme.
fn split_scheme(value: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (valid && rest.starts_with('/')).then_some((scheme, rest))
}

fn check_http(url: Url) -> Result<Url, ProxyError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::invalid(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ProxyError::invalid(format!("{} has no host", url)));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
