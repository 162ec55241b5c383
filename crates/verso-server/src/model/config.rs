//! Configuration management for the Verso server
//!
//! Sources, later ones winning: TOML files, `VERSO_*` environment variables,
//! command line arguments. Inside a container the PostgreSQL file is skipped
//! and `DATABASE_URL` is required unless the memory backend is selected.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use verso_persistence::StorageMode;

use super::constants::*;
use crate::startup::LoggingConfig;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(name = "verso-server", version, about = "Versioned per-service configuration store")]
pub struct Cli {
    /// Path to the gRPC server config file
    #[arg(long = "grpc-conf", default_value = DEFAULT_GRPC_CONF_PATH)]
    pub grpc_conf: PathBuf,
    /// Path to the PostgreSQL config file
    #[arg(long = "postgresql-conf", default_value = DEFAULT_POSTGRESQL_CONF_PATH)]
    pub postgresql_conf: PathBuf,
    #[arg(long = "database-url", env = DATABASE_URL_ENV)]
    pub database_url: Option<String>,
    /// Storage backend: external_db or memory
    #[arg(long = "storage-mode")]
    pub storage_mode: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug)]
pub struct Configuration {
    pub config: Config,
}

/// Whether the process runs inside a Docker container.
pub fn is_running_in_container() -> bool {
    Path::new(DOCKER_ENV_MARKER).exists()
}

impl Configuration {
    /// Parse the command line and load every configuration source.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_cli(Cli::parse(), is_running_in_container())
    }

    pub fn from_cli(args: Cli, in_container: bool) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(
            File::from(args.grpc_conf.as_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        if in_container {
            tracing::debug!("Container detected, skipping PostgreSQL config file");
        } else {
            builder = builder.add_source(
                File::from(args.postgresql_conf.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let url_supplied = args.database_url.is_some();
        if let Some(url) = args.database_url {
            builder = builder
                .set_override(DATABASE_URL, url)
                .context("Failed to set database URL override")?;
        }
        if let Some(mode) = args.storage_mode {
            builder = builder
                .set_override(STORAGE_MODE, mode)
                .context("Failed to set storage mode override")?;
        }

        let config = builder.build().context("Failed to load configuration")?;
        let configuration = Self { config };

        if in_container
            && !url_supplied
            && configuration.storage_mode()? == StorageMode::ExternalDb
        {
            bail!(
                "{} must be set when running in a container",
                DATABASE_URL_ENV
            );
        }

        Ok(configuration)
    }

    pub fn grpc_network(&self) -> String {
        self.config
            .get_string(GRPC_NETWORK)
            .unwrap_or_else(|_| DEFAULT_GRPC_NETWORK.to_string())
    }

    pub fn grpc_bind_addr(&self) -> String {
        self.config
            .get_string(GRPC_BIND_ADDR)
            .unwrap_or_else(|_| DEFAULT_GRPC_BIND_ADDR.to_string())
    }

    /// Resolve the listen address; a bare `:port` binds every interface.
    pub fn grpc_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let network = self.grpc_network();
        if network != DEFAULT_GRPC_NETWORK {
            bail!("unsupported gRPC network '{}', only 'tcp' is supported", network);
        }

        let bind_addr = self.grpc_bind_addr();
        let normalized = match bind_addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => bind_addr.clone(),
        };
        normalized
            .parse()
            .with_context(|| format!("invalid gRPC bind address '{}'", bind_addr))
    }

    pub fn storage_mode(&self) -> anyhow::Result<StorageMode> {
        match self.config.get_string(STORAGE_MODE) {
            Ok(mode) => mode.parse().map_err(anyhow::Error::msg),
            Err(_) => Ok(StorageMode::default()),
        }
    }

    pub fn database_url(&self) -> String {
        self.config
            .get_string(DATABASE_URL)
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn log_level(&self) -> String {
        self.config
            .get_string(LOG_LEVEL)
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.config.get_string(LOG_DIR).ok().map(PathBuf::from)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(&self.log_level(), self.log_dir())
    }

    fn non_negative<T: TryFrom<i64>>(&self, key: &str, default: i64) -> anyhow::Result<T> {
        let value = self.config.get_int(key).unwrap_or(default);
        T::try_from(value)
            .map_err(|_| anyhow::anyhow!("out of range value {}", value))
            .with_context(|| format!("invalid configuration '{}'", key))
    }

    pub fn database_connect_options(&self) -> anyhow::Result<ConnectOptions> {
        let max_connections: u32 =
            self.non_negative(DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        let min_connections: u32 =
            self.non_negative(DATABASE_MIN_CONNECTIONS, DEFAULT_MIN_CONNECTIONS)?;
        let connect_timeout: u64 =
            self.non_negative(DATABASE_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let acquire_timeout: u64 =
            self.non_negative(DATABASE_ACQUIRE_TIMEOUT_SECS, DEFAULT_ACQUIRE_TIMEOUT_SECS)?;
        let sqlx_logging = self
            .config
            .get_bool(DATABASE_SQLX_LOGGING)
            .unwrap_or(false);

        let mut opt = ConnectOptions::new(self.database_url());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .sqlx_logging(sqlx_logging);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            acquire_timeout = acquire_timeout,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        Ok(opt)
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        Database::connect(self.database_connect_options()?)
            .await
            .context("Failed to connect to the config database")
    }
}
