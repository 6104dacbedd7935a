//! # livecam Config
//!
//! Configuration management for the livecam server and resolver.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, PROXY_BASE_ENV};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
