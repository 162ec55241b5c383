// In-memory persistence backend
// Keeps the repository tables in process; every call takes the table lock
// once, which makes each operation atomic the way a transaction would.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use verso_common::{
    ConfigData, DeletedConfig, INITIAL_VERSION, Result, ServiceConfig, VersoError,
};

use crate::model::StorageMode;
use crate::traits::{ConfigPersistence, PersistenceService};

#[derive(Default)]
struct Tables {
    last_id: i32,
    /// service -> config id
    configs: HashMap<String, i32>,
    /// config id -> version -> payload
    versions: HashMap<i32, BTreeMap<u32, Vec<u8>>>,
}

impl Tables {
    fn config_id(&self, service: &str) -> Result<i32> {
        self.configs
            .get(service)
            .copied()
            .ok_or_else(|| VersoError::NotFound(service.to_string()))
    }

    fn versions_mut(&mut self, config_id: i32) -> &mut BTreeMap<u32, Vec<u8>> {
        self.versions.entry(config_id).or_default()
    }
}

/// In-process persistence service
///
/// Suitable for tests and local development. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryPersistService {
    tables: Mutex<Tables>,
}

impl MemoryPersistService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::Memory
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ConfigPersistence for MemoryPersistService {
    async fn config_create(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig> {
        let payload = data.encode()?;
        let mut tables = self.tables.lock();

        if tables.configs.contains_key(service) {
            warn!(service, "Rejected create for existing config");
            return Err(VersoError::AlreadyExists(service.to_string()));
        }

        tables.last_id += 1;
        let config_id = tables.last_id;
        tables.configs.insert(service.to_string(), config_id);
        tables
            .versions_mut(config_id)
            .insert(INITIAL_VERSION, payload);

        debug!(service, config_id, "Config created");
        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version: INITIAL_VERSION,
            data: data.clone(),
        })
    }

    async fn config_read(&self, service: &str, version: Option<u32>) -> Result<ServiceConfig> {
        let tables = self.tables.lock();
        let config_id = tables.config_id(service)?;
        let versions = tables.versions.get(&config_id);

        let (version, payload) = match version {
            None => versions
                .and_then(|v| v.last_key_value())
                .ok_or_else(|| VersoError::NotFound(service.to_string()))?,
            Some(v) => versions
                .and_then(|all| all.get_key_value(&v))
                .ok_or_else(|| VersoError::VersionNotFound(service.to_string(), v))?,
        };

        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version: *version,
            data: ConfigData::decode(payload)?,
        })
    }

    async fn config_update(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig> {
        let payload = data.encode()?;
        let mut tables = self.tables.lock();
        let config_id = tables.config_id(service)?;
        let versions = tables.versions_mut(config_id);

        let next_version = match versions.last_key_value() {
            Some((_, latest)) if *latest == payload => {
                warn!(service, "Rejected config update without changes");
                return Err(VersoError::NoChange(service.to_string()));
            }
            Some((latest, _)) => latest.checked_add(1).ok_or_else(|| {
                VersoError::StoreUnavailable(format!(
                    "version counter exhausted for service '{}'",
                    service
                ))
            })?,
            None => INITIAL_VERSION,
        };
        versions.insert(next_version, payload);

        debug!(service, config_id, version = next_version, "Config updated");
        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version: next_version,
            data: data.clone(),
        })
    }

    async fn config_delete(&self, service: &str, version: Option<u32>) -> Result<DeletedConfig> {
        let mut tables = self.tables.lock();
        let config_id = tables.config_id(service)?;

        match version {
            None => {
                tables.versions.remove(&config_id);
                tables.configs.remove(service);
                debug!(service, config_id, "Config deleted");
            }
            Some(v) => {
                if tables.versions_mut(config_id).remove(&v).is_none() {
                    return Err(VersoError::VersionNotFound(service.to_string(), v));
                }
                debug!(service, config_id, version = v, "Config version deleted");
            }
        }

        Ok(DeletedConfig {
            id: config_id,
            service: service.to_string(),
            version,
        })
    }

    async fn config_versions(&self, service: &str) -> Result<Vec<u32>> {
        let tables = self.tables.lock();
        let config_id = tables.config_id(service)?;
        Ok(tables
            .versions
            .get(&config_id)
            .map(|v| v.keys().copied().collect())
            .unwrap_or_default())
    }
}
