//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file at {0}")]
    NotFound(String),

    /// First validation error; the rest are in the [`ValidationResult`](crate::ValidationResult).
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Config references unset environment variable ${{{0}}}")]
    EnvVarNotSet(String),

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}
