//! gRPC server setup.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::info;

use verso_persistence::PersistenceService;

use super::shutdown::ShutdownSignal;
use crate::api::ConfigControllerService;
use crate::api::grpc::config_controller_server::ConfigControllerServer;

/// Serve the config controller on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    persistence: Arc<dyn PersistenceService>,
    shutdown: &ShutdownSignal,
) -> anyhow::Result<()> {
    let local_addr = listener
        .local_addr()
        .context("Failed to read gRPC listener address")?;
    let mut shutdown_rx = shutdown.subscribe();

    info!(
        addr = %local_addr,
        storage_mode = %persistence.storage_mode(),
        "Starting gRPC config controller"
    );

    Server::builder()
        .add_service(ConfigControllerServer::new(ConfigControllerService::new(
            persistence,
        )))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("gRPC server error")?;

    info!("gRPC config controller stopped");
    Ok(())
}
