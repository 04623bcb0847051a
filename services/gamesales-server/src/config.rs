//! Server Configuration
//!
//! Layered configuration: optional file, `config/default`, `config/local`,
//! then `GAMESALES__*` environment variables. CLI flags are applied last by
//! `main`.

use std::net::SocketAddr;

use anyhow::Context;
use gamesales_api::ApiConfig;
use gamesales_db::DatabaseConfig;
use gamesales_engine::EngineSettings;
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server binding configuration
    pub server: ServerSettings,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP layer configuration
    pub api: ApiConfig,

    /// Level table, race geometry, leaderboard size, tier retention
    pub engine: EngineSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Serve the seeded in-memory store instead of PostgreSQL
    pub in_memory: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            in_memory: false,
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter
    pub enabled: bool,

    /// Exporter port (separate from the API)
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("GAMESALES")
                    .separator("__")
                    .try_parsing(true),
            );

        let server_config: ServerConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        Ok(server_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert!(!config.server.in_memory);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.engine.leaderboard_limit, 20);
        assert!(config.server.socket_addr().is_ok());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "server": { "port": 8080 },
                "engine": { "tier_retention": "high_water_mark" },
                "metrics": { "enabled": false }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.engine.tier_retention,
            gamesales_engine::TierRetention::HighWaterMark
        );
        assert!(!config.metrics.enabled);
        assert_eq!(config.database.pg_max_connections, 20);
    }

    #[test]
    fn test_bad_host_rejected() {
        let settings = ServerSettings {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(settings.socket_addr().is_err());
    }
}
