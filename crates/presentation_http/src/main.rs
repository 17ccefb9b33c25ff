//! Migration gateway HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use infrastructure::{
    AppConfig, ContentstackIdentityProvider, FileLogSink, HttpMigrationService, JwtTokenService,
    LogFormat, RedbKeyValueStore, SecurityValidator, init_tracing,
    telemetry::DEFAULT_LOG_FILTER,
};
use presentation_http::{AppState, Ports, create_app, set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let log_format = config.server.log_format.parse().unwrap_or(LogFormat::Text);
    init_tracing(log_format, DEFAULT_LOG_FILTER)?;

    info!("Migration gateway v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = &loaded {
        warn!("Failed to load config, using defaults: {}", e);
    }

    let warnings = SecurityValidator::validate(&config);
    SecurityValidator::log_warnings(&warnings);
    if SecurityValidator::should_block_startup(&config, &warnings) {
        anyhow::bail!("Refusing to start with critical security issues in production");
    }

    set_expose_internal_errors(config.server.expose_internal_errors && !config.is_production());

    info!(
        host = %config.server.host,
        port = %config.server.port,
        environment = %config.environment.unwrap_or_default(),
        "Configuration loaded"
    );

    let store = RedbKeyValueStore::open(&config.storage.path)
        .with_context(|| format!("opening session store at {}", config.storage.path.display()))?;
    let identity = ContentstackIdentityProvider::from_config(config.regions.clone(), &config.upstream)
        .context("creating identity provider client")?;
    let migration = HttpMigrationService::from_config(&config.migration, &config.upstream)
        .context("creating migration service client")?;

    let state = AppState::new(Ports {
        identity: Arc::new(identity),
        migration: Arc::new(migration),
        tokens: Arc::new(JwtTokenService::from_config(&config.auth)),
        store: Arc::new(store),
        log_sink: Arc::new(FileLogSink::new(config.logging.file.clone())),
    });

    let app = create_app(state, &config.server);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM) and handle graceful shutdown
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("Waiting up to {:?} for connections to close...", timeout);
}
