//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_endpoints(config, &mut result);
        Self::validate_proxy(config, &mut result);
        Self::validate_resolver(config, &mut result);
        Self::validate_frame(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_endpoints(config: &Config, result: &mut ValidationResult) {
        let endpoints = &config.endpoints;

        if let Some(base) = endpoints.base() {
            if !is_http_url(base) {
                result.add_error(ValidationError::new(
                    "endpoints.base_url",
                    format!("Not an absolute http(s) URL: {}", base),
                ));
            }
        }

        let paths = [
            ("endpoints.proxy_path", &endpoints.proxy_path),
            ("endpoints.frame_path", &endpoints.frame_path),
            ("endpoints.embed_path", &endpoints.embed_path),
            ("endpoints.manifest_path", &endpoints.manifest_path),
        ];
        for (field, path) in paths {
            if !path.starts_with('/') || path.len() < 2 {
                result.add_error(ValidationError::new(
                    field,
                    format!("Path must start with '/' and name a route: {:?}", path),
                ));
            } else if path.ends_with('/') || path.contains('?') {
                result.add_error(ValidationError::new(
                    field,
                    format!("Path must not end with '/' or carry a query: {}", path),
                ));
            }
        }

        if endpoints.proxy_path == endpoints.frame_path {
            result.add_error(ValidationError::new(
                "endpoints.frame_path",
                "Frame path must differ from proxy path",
            ));
        }
    }

    fn validate_proxy(config: &Config, result: &mut ValidationResult) {
        let proxy = &config.proxy;

        if proxy.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "proxy.timeout_secs",
                "Timeout must be at least one second",
            ));
        } else if proxy.timeout_secs > 300 {
            result.add_warning(ValidationWarning::new(
                "proxy.timeout_secs",
                format!("Very long upstream timeout: {}s", proxy.timeout_secs),
            ));
        }

        if let Some(origin) = &proxy.upstream_origin {
            if !is_http_url(origin) {
                result.add_error(ValidationError::new(
                    "proxy.upstream_origin",
                    format!("Not an absolute http(s) URL: {}", origin),
                ));
            }
        }

        if proxy.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "proxy.allowed_hosts",
                "Allowed host entries cannot be empty",
            ));
        }

        let public_bind = config.server.host != "127.0.0.1" && config.server.host != "localhost";
        if public_bind && proxy.allowed_hosts.is_empty() {
            result.add_warning(ValidationWarning::new(
                "proxy.allowed_hosts",
                format!(
                    "Proxy bound to {} forwards to any host; consider an allowlist",
                    config.server.host
                ),
            ));
        }
    }

    fn validate_resolver(config: &Config, result: &mut ValidationResult) {
        let resolver = &config.resolver;

        if resolver.probe_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "resolver.probe_timeout_secs",
                "Probe timeout must be at least one second",
            ));
        } else if resolver.probe_timeout_secs > 120 {
            result.add_warning(ValidationWarning::new(
                "resolver.probe_timeout_secs",
                format!(
                    "Probes may stall a selection for {}s",
                    resolver.probe_timeout_secs
                ),
            ));
        }

        if !resolver.embed_template.contains("{id}") {
            result.add_error(ValidationError::new(
                "resolver.embed_template",
                "Template must contain the {id} placeholder",
            ));
        } else if !is_http_url(&resolver.embed_template.replace("{id}", "x")) {
            result.add_error(ValidationError::new(
                "resolver.embed_template",
                format!("Not an absolute http(s) URL: {}", resolver.embed_template),
            ));
        }
    }

    fn validate_frame(config: &Config, result: &mut ValidationResult) {
        if config.frame.grace_period_ms == 0 {
            result.add_error(ValidationError::new(
                "frame.grace_period_ms",
                "Grace period cannot be 0",
            ));
        }
    }
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
