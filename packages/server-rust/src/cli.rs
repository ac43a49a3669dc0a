//! Command-line and environment configuration for the server binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::network::NetworkConfig;
use crate::storage::StorageConfig;
use crate::telemetry::LogFormat;

/// Persistence backend selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// Process-local, lost on exit.
    Memory,
    /// Embedded redb file at `--data-path`.
    Redb,
    /// `PostgreSQL` at `--database-url`.
    Postgres,
}

impl Default for StorageKind {
    fn default() -> Self {
        if cfg!(feature = "redb") {
            Self::Redb
        } else {
            Self::Memory
        }
    }
}

/// Top-level CLI parser for the `cellar-server` binary.
#[derive(Debug, Parser)]
#[command(name = "cellar-server", version, about = "Cellar - a small wine catalog")]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "CELLAR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, env = "CELLAR_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Storage backend
    #[arg(long, env = "CELLAR_STORAGE", value_enum, default_value_t = StorageKind::default())]
    pub storage: StorageKind,

    /// Database file for the redb backend
    #[arg(long, env = "CELLAR_DATA_PATH", default_value = "cellar.redb")]
    pub data_path: PathBuf,

    /// Connection URL for the postgres backend
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Postgres connection pool size
    #[arg(long, env = "CELLAR_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds a request may run before it is answered with 408
    #[arg(long, env = "CELLAR_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "CELLAR_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// Log output: pretty or json
    #[arg(long, env = "CELLAR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            ..NetworkConfig::default()
        }
    }

    /// Resolves the selected backend into a [`StorageConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error when `postgres` is selected without a database URL.
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        Ok(match self.storage {
            StorageKind::Memory => StorageConfig::Memory,
            StorageKind::Redb => StorageConfig::Redb {
                path: self.data_path.clone(),
            },
            StorageKind::Postgres => {
                let Some(url) = self.database_url.clone() else {
                    anyhow::bail!("--database-url (or DATABASE_URL) is required for postgres storage");
                };
                StorageConfig::Postgres {
                    url,
                    max_connections: self.max_connections,
                }
            }
        })
    }
}
