//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Start the config watcher and signal listener
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::path::Path;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, ConfigError, ConfigWatcher, EdgeConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{logging, metrics};

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Load the config at `path`, or the defaults when no path is given.
pub fn resolve_config(path: Option<&Path>) -> Result<EdgeConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EdgeConfig::default()),
    }
}

/// Bring the edge up and serve until a termination signal arrives.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let config = resolve_config(config_path)?;
    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-normalizer starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.address,
        dot_scope = ?config.normalizer.dot_scope,
        index_document = %config.normalizer.index_document,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    // The watcher must outlive the server for updates to keep flowing.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_defaults() {
        assert_eq!(resolve_config(None).unwrap(), EdgeConfig::default());
    }

    #[test]
    fn test_resolve_config_missing_file() {
        let err = resolve_config(Some(Path::new("/nonexistent/edge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
