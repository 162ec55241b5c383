//! Configuration keys and defaults for the Verso server

pub const DEFAULT_GRPC_CONF_PATH: &str = "configs/grpc_server_config.toml";
pub const DEFAULT_POSTGRESQL_CONF_PATH: &str = "configs/postgresql_config.toml";

pub const ENV_PREFIX: &str = "VERSO";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DOCKER_ENV_MARKER: &str = "/.dockerenv";

// gRPC
pub const GRPC_NETWORK: &str = "grpc.network";
pub const GRPC_BIND_ADDR: &str = "grpc.bind_addr";
pub const DEFAULT_GRPC_NETWORK: &str = "tcp";
pub const DEFAULT_GRPC_BIND_ADDR: &str = "0.0.0.0:8080";

// Storage
pub const STORAGE_MODE: &str = "storage.mode";

// Database
pub const DATABASE_URL: &str = "database.url";
pub const DATABASE_MAX_CONNECTIONS: &str = "database.max_connections";
pub const DATABASE_MIN_CONNECTIONS: &str = "database.min_connections";
pub const DATABASE_CONNECT_TIMEOUT_SECS: &str = "database.connect_timeout_secs";
pub const DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "database.acquire_timeout_secs";
pub const DATABASE_SQLX_LOGGING: &str = "database.sqlx_logging";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/config_controller";
pub const DEFAULT_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_MIN_CONNECTIONS: i64 = 1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: i64 = 8;

// Logging
pub const LOG_LEVEL: &str = "log.level";
pub const LOG_DIR: &str = "log.dir";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_FILE_NAME: &str = "verso.log";
