//! gRPC API of the config controller

pub mod service;

/// Code generated from `proto/verso.proto`
pub mod grpc {
    tonic::include_proto!("verso");
}

pub use service::ConfigControllerService;
