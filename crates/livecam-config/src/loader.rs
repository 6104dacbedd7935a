//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Environment variable overriding `endpoints.base_url`. An empty value
/// switches the proxy off.
pub const PROXY_BASE_ENV: &str = "LIVECAM_PROXY_BASE";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    /// Environment overrides are applied either way.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        let mut config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(e) => return Err(e),
        };
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Apply process environment overrides.
    pub fn apply_env_overrides(config: &mut Config) {
        if let Ok(base) = std::env::var(PROXY_BASE_ENV) {
            let base = base.trim();
            config.endpoints.base_url = (!base.is_empty()).then(|| base.to_string());
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.livecam`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
