//! Verso Server - gRPC front of the versioned configuration store

pub mod api; // gRPC service and generated protocol types
pub mod model; // Configuration
pub mod startup; // Logging, server bootstrap, shutdown
