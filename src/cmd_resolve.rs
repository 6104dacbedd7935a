//! One-off subcommands: `resolve` and `check-config`.

use std::path::Path;

use tracing::{info, warn};

use livecam_config::{Config, ConfigValidator};
use livecam_runtime::{MarkerRegistry, ResolutionEngine};

/// Resolve one marker from a registry file and print the outcome as JSON.
pub(crate) async fn resolve_marker(
    config: &Config,
    markers: &Path,
    marker_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = MarkerRegistry::load(markers)?;
    let marker = registry.require(marker_id)?.clone();
    let engine = ResolutionEngine::from_config(config)?;

    info!(marker_id, backend = engine.has_backend(), "Resolving");
    let resolution = engine.resolve(marker).await?;
    let (state, attempts) = resolution.into_parts();

    let output = serde_json::json!({
        "markerId": marker_id,
        "state": state,
        "attempts": attempts,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Validate the configuration, printing every finding.
pub(crate) fn check_config(config: &Config, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);

    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    let warnings = result.into_result()?;
    println!(
        "{} is valid ({} warning(s))",
        path.display(),
        warnings.len()
    );
    Ok(())
}
