//! GameSales API Server
//!
//! Serves the GameSales REST API over PostgreSQL, or over a seeded
//! in-memory store for demos.
//!
//! # Usage
//!
//! ```bash
//! # Start against PostgreSQL
//! DATABASE_URL=postgres://localhost/gamesales gamesales-server
//!
//! # Start with the demo data set
//! gamesales-server --in-memory
//!
//! # Environment overrides
//! GAMESALES__SERVER__PORT=8080 GAMESALES__ENGINE__LEADERBOARD_LIMIT=10 gamesales-server
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gamesales_api::{create_router, spawn_refresher, AppState};
use gamesales_db::{MemoryStore, PgStore, SalesStore};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// GameSales API Server
#[derive(Parser, Debug)]
#[command(name = "gamesales-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "GAMESALES_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "GAMESALES_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GAMESALES_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GAMESALES_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "GAMESALES_LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Apply bundled migrations before serving
    #[arg(long)]
    migrate: bool,

    /// Serve a seeded in-memory store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

impl Args {
    /// Apply CLI overrides on top of loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.database.postgres_url = url;
        }
        if self.migrate {
            config.database.run_migrations = true;
        }
        if self.in_memory {
            config.server.in_memory = true;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.take().as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting GameSales API Server"
    );

    let store = init_store(&server_config).await?;
    let state = Arc::new(
        AppState::new(store, server_config.engine.clone()).context("invalid engine settings")?,
    );

    if let Err(e) = state
        .views
        .refresh(state.store.as_ref(), &state.settings.race)
        .await
    {
        tracing::warn!(error = %e, "Initial view build failed; views will build on first request");
    }
    let refresher = spawn_refresher(state.clone());

    if server_config.metrics.enabled {
        start_metrics_exporter(server_config.metrics.port)?;
    }

    let app = create_router(state, server_config.api.clone());

    let addr = server_config.server.socket_addr()?;
    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.abort();
    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Build the backing store
async fn init_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn SalesStore>> {
    if config.server.in_memory {
        let store = MemoryStore::demo();
        log_demo_users(&store).await?;
        return Ok(Arc::new(store));
    }

    tracing::info!(url = %config.database.postgres_url_masked(), "Connecting to database...");
    let store = PgStore::connect(&config.database).await?;

    if config.database.run_migrations {
        store.migrate().await?;
    }

    let health = store.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }
    tracing::info!(backend = %health.backend, "Database health check passed");

    // Runs for the life of the process
    let _listener = store.start_listener();

    Ok(Arc::new(store))
}

/// Print the ids a demo client can send as `X-User-Id`
async fn log_demo_users(store: &MemoryStore) -> anyhow::Result<()> {
    tracing::info!("Serving in-memory demo data");
    for profile in store.approved_profiles().await? {
        tracing::info!(
            user_id = %profile.id.as_uuid(),
            name = %profile.display_name,
            role = profile.role.as_db_str(),
            "Demo user"
        );
    }
    for request in store.pending_signups().await? {
        tracing::info!(
            user_id = %request.user_id.as_uuid(),
            name = %request.display_name,
            signup_id = %request.id.as_uuid(),
            "Demo user awaiting approval"
        );
    }
    Ok(())
}

/// Install the Prometheus recorder with its own HTTP listener
fn start_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to start metrics exporter")?;

    tracing::info!(port, "Metrics exporter started");
    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
