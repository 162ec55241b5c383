//! Logging setup
//!
//! Console output always; a daily-rolling `verso.log` when a log directory is
//! configured. `RUST_LOG` takes precedence over the configured level.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::model::LOG_FILE_NAME;

/// Logging configuration for the server.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// File logging is enabled only when set
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Build from configuration values; an unknown level falls back to `info`.
    pub fn from_config(level: &str, log_dir: Option<PathBuf>) -> Self {
        Self {
            level: level.parse().unwrap_or(Level::INFO),
            log_dir,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }
}

/// Keeps the non-blocking file writer alive; drop it last to flush.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_filter(config.filter());
    layers.push(Box::new(console_layer));

    let file_guard = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false)
                .with_filter(config.filter());
            layers.push(Box::new(file_layer));
            Some(guard)
        }
        None => None,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(dir) = &config.log_dir {
        tracing::info!(log_dir = %dir.display(), "File logging initialized");
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_config() {
        let config = LoggingConfig::from_config("debug", None);
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.log_dir.is_none());

        let config = LoggingConfig::from_config("chatty", Some(PathBuf::from("/tmp/verso")));
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/verso")));
    }
}
