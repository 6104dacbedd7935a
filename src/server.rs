//! Tracing setup and server startup.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use livecam_api::{ApiServer, AppState, ServerConfig};
use livecam_config::{Config, ConfigLoader, LoggingConfig};
use livecam_runtime::MarkerRegistry;

/// Get the .livecam directory path.
pub(crate) fn livecam_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".livecam"))
        .unwrap_or_else(|| PathBuf::from(".livecam"))
}

fn log_dir(logging: &LoggingConfig) -> PathBuf {
    logging
        .directory
        .as_ref()
        .map(|p| PathBuf::from(ConfigLoader::expand_path(&p.to_string_lossy())))
        .unwrap_or_else(|| livecam_dir().join("logs"))
}

/// Initialize tracing with console and optional file output.
///
/// Log files rotate daily under `~/.livecam/logs` unless configured
/// otherwise. Console output goes to stderr so `resolve` can print JSON on
/// stdout.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = if logging.file {
        let dir = log_dir(logging);
        std::fs::create_dir_all(&dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("livecam")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keeps the writer thread alive for the life of the process
        static GUARD: OnceLock<WorkerGuard> = OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the registry, or start empty when the file does not exist.
pub(crate) fn load_registry(path: &Path) -> Result<MarkerRegistry, Box<dyn std::error::Error>> {
    if !path.exists() {
        warn!("Marker registry {} not found, starting empty", path.display());
        return Ok(MarkerRegistry::default());
    }
    let registry = MarkerRegistry::load(path)?;
    info!("Loaded {} markers from {}", registry.len(), path.display());
    Ok(registry)
}

/// Run the server in foreground.
pub(crate) async fn run_server(
    config: Config,
    markers: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting livecam v{}", env!("CARGO_PKG_VERSION"));

    let registry = load_registry(markers)?;
    let server_config = ServerConfig::from(&config.server);
    let endpoints = config.endpoints.clone();
    let state = Arc::new(AppState::new(config, registry)?);

    match endpoints.base() {
        Some(base) => info!("Proxy base: {}", base),
        None => warn!("No base_url configured: links stay direct and probes are skipped"),
    }

    let server = ApiServer::new(server_config, state);
    info!("livecam ready at http://{}", server.addr());
    info!("  GET  {}?url=...  - stream proxy", endpoints.proxy_path);
    info!("  GET  {}?url=...  - frame proxy", endpoints.frame_path);
    info!("  GET  {}?url=...  - embed extraction", endpoints.embed_path);
    info!("  GET  {}?url=...  - manifest extraction", endpoints.manifest_path);
    info!("  POST /api/resolve, /api/session/select");

    server.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
