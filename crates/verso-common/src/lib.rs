//! Verso Common - Shared types, errors, and the config value codec
//!
//! This crate provides the foundational types used across all Verso components:
//! - Error taxonomy and error codes
//! - The codec that merges client fragments into a canonical payload
//! - Domain model types exchanged between the store and the transport

pub mod codec;
pub mod error;
pub mod model;

// Re-exports for convenience
pub use codec::{ConfigData, Fragment};
pub use error::{ErrorCode, Result, VersoError};
pub use model::{ConfigSubmission, DeletedConfig, ServiceConfig, requested_version};

/// First version assigned to a newly created configuration
pub const INITIAL_VERSION: u32 = 1;
