//! Persistence traits
//!
//! `ConfigPersistence` is the versioning protocol; `PersistenceService` adds
//! the backend-level operations the server needs at startup.

pub mod config;

pub use config::ConfigPersistence;

use async_trait::async_trait;

use crate::model::StorageMode;

/// Unified persistence service trait
#[async_trait]
pub trait PersistenceService: ConfigPersistence + Send + Sync {
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> verso_common::Result<()>;
}
