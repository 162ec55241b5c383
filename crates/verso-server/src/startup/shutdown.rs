//! Graceful shutdown handling

use tokio::sync::broadcast;
use tracing::{error, info};

/// Broadcast handle fired once when the process should stop
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a watcher for Ctrl+C and SIGTERM and return the signal it fires.
pub fn wait_for_shutdown_signal() -> ShutdownSignal {
    let shutdown = ShutdownSignal::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }

        shutdown_clone.shutdown();
    });

    shutdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_sees_shutdown() {
        let signal = ShutdownSignal::default();
        let mut server = signal.subscribe();
        let mut worker = signal.clone().subscribe();

        assert!(server.try_recv().is_err());
        signal.shutdown();

        assert!(server.try_recv().is_ok());
        assert!(worker.try_recv().is_ok());
    }

    #[test]
    fn test_shutdown_without_subscribers_is_harmless() {
        let signal = ShutdownSignal::new();
        signal.shutdown();

        // Late subscribers only see signals sent after they subscribed
        let mut late = signal.subscribe();
        assert!(late.try_recv().is_err());
    }
}
