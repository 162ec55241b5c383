//! Application startup utilities module.

mod grpc;
mod logging;
mod shutdown;

pub use grpc::serve;
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
