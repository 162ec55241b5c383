//! Main entry point for the Verso config controller.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use verso_persistence::{
    ExternalDbPersistService, MemoryPersistService, PersistenceService, StorageMode, ensure_schema,
};
use verso_server::{model::Configuration, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::new()?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let storage_mode = configuration.storage_mode()?;
    info!("Persistence mode: {}", storage_mode);

    let persistence: Arc<dyn PersistenceService> = match storage_mode {
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            ensure_schema(&db)
                .await
                .context("Failed to bootstrap the config schema")?;
            Arc::new(ExternalDbPersistService::new(db))
        }
        StorageMode::Memory => Arc::new(MemoryPersistService::new()),
    };
    persistence
        .health_check()
        .await
        .context("Config store health check failed")?;

    let addr = configuration.grpc_socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind gRPC listener on {}", addr))?;

    let shutdown = startup::wait_for_shutdown_signal();
    startup::serve(listener, persistence, &shutdown).await?;

    info!("Verso server shut down");
    Ok(())
}
