//! Config persistence trait
//!
//! Every implementation applies each operation atomically: a failed call
//! leaves the stored configuration exactly as it was.

use async_trait::async_trait;

use verso_common::{ConfigData, DeletedConfig, Result, ServiceConfig};

/// Versioned configuration repository operations
#[async_trait]
pub trait ConfigPersistence: Send + Sync {
    /// Create `service` with `data` as version 1.
    ///
    /// Fails with `AlreadyExists` when the service already has a metadata row.
    async fn config_create(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig>;

    /// Read the latest version, or exactly `version` when given.
    async fn config_read(&self, service: &str, version: Option<u32>) -> Result<ServiceConfig>;

    /// Append `data` as the next version.
    ///
    /// Fails with `NoChange` when `data` encodes to the same bytes as the
    /// latest stored version.
    async fn config_update(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig>;

    /// Delete one version, or the whole configuration when `version` is `None`.
    async fn config_delete(&self, service: &str, version: Option<u32>) -> Result<DeletedConfig>;

    /// Stored version numbers of `service`, ascending
    async fn config_versions(&self, service: &str) -> Result<Vec<u32>>;
}
