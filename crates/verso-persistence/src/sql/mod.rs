//! SQL-based persistence backend (PostgreSQL/MySQL via SeaORM)
//!
//! Every operation runs inside one `DatabaseTransaction`. Returning early with
//! `?` drops the transaction, which rolls it back, so a failed call never
//! leaves a metadata row without its first version or a version counter
//! without its payload.
//!
//! Update serializes on the metadata row with `SELECT ... FOR UPDATE` before
//! reading the latest version. The `(config_id, version)` primary key is the
//! second line of defence: a colliding insert restarts the whole transaction
//! up to `UPDATE_RETRY_LIMIT` times.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use tracing::{debug, warn};

use verso_common::{
    ConfigData, DeletedConfig, INITIAL_VERSION, Result, ServiceConfig, VersoError,
};

use crate::entity::{config, data_config};
use crate::model::StorageMode;
use crate::traits::{ConfigPersistence, PersistenceService};

/// Attempts made by update before a version collision is surfaced
pub const UPDATE_RETRY_LIMIT: usize = 3;

/// External database persistence service
///
/// Owns the SeaORM `DatabaseConnection` pool handed in at construction.
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    /// Create a new ExternalDbPersistService with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// One update attempt in its own transaction.
    async fn try_update(
        &self,
        service: &str,
        payload: &[u8],
    ) -> std::result::Result<(i32, u32), UpdateError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let config_id = lock_config_id(&txn, service)
            .await?
            .ok_or_else(|| VersoError::NotFound(service.to_string()))?;

        let next_version = match latest_row(&txn, config_id).await? {
            Some(latest) if latest.data == payload => {
                return Err(VersoError::NoChange(service.to_string()).into());
            }
            Some(latest) => latest.version.checked_add(1).ok_or_else(|| {
                VersoError::StoreUnavailable(format!(
                    "version counter exhausted for service '{}'",
                    service
                ))
            })?,
            None => INITIAL_VERSION as i32,
        };

        let row = data_config::ActiveModel {
            config_id: Set(config_id),
            version: Set(next_version),
            data: Set(payload.to_vec()),
        };
        if let Err(e) = data_config::Entity::insert(row)
            .exec_without_returning(&txn)
            .await
        {
            return Err(if is_unique_violation(&e) {
                UpdateError::VersionConflict(e)
            } else {
                UpdateError::Rejected(store_err(e))
            });
        }

        txn.commit().await.map_err(store_err)?;
        Ok((config_id, from_db_version(next_version)?))
    }
}

/// Outcome of a failed update attempt
enum UpdateError {
    /// Another writer took the version slot; the attempt may be retried
    VersionConflict(DbErr),
    Rejected(VersoError),
}

impl From<VersoError> for UpdateError {
    fn from(e: VersoError) -> Self {
        UpdateError::Rejected(e)
    }
}

/// Run `attempt` until it stops colliding on the version key, at most
/// `UPDATE_RETRY_LIMIT` times.
async fn retry_on_version_conflict<F, Fut>(service: &str, mut attempt: F) -> Result<(i32, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(i32, u32), UpdateError>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Ok(written) => return Ok(written),
            Err(UpdateError::VersionConflict(e)) if tries < UPDATE_RETRY_LIMIT => {
                warn!(service, attempt = tries, error = %e, "Version slot taken, retrying update");
                tries += 1;
            }
            Err(UpdateError::VersionConflict(e)) => return Err(store_err(e)),
            Err(UpdateError::Rejected(e)) => {
                if e.is_client_error() {
                    warn!(service, error = %e, "Rejected config update");
                }
                return Err(e);
            }
        }
    }
}

fn store_err(e: DbErr) -> VersoError {
    VersoError::StoreUnavailable(e.to_string())
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn from_db_version(version: i32) -> Result<u32> {
    u32::try_from(version)
        .map_err(|_| VersoError::CorruptPayload(format!("invalid stored version {}", version)))
}

async fn find_config_id<C: ConnectionTrait>(conn: &C, service: &str) -> Result<Option<i32>> {
    config::Entity::find()
        .select_only()
        .column(config::Column::Id)
        .filter(config::Column::Service.eq(service))
        .into_tuple::<i32>()
        .one(conn)
        .await
        .map_err(store_err)
}

/// Like `find_config_id`, holding a row lock on the metadata row until the
/// transaction ends.
async fn lock_config_id<C: ConnectionTrait>(conn: &C, service: &str) -> Result<Option<i32>> {
    config::Entity::find()
        .select_only()
        .column(config::Column::Id)
        .filter(config::Column::Service.eq(service))
        .lock_exclusive()
        .into_tuple::<i32>()
        .one(conn)
        .await
        .map_err(store_err)
}

async fn latest_row<C: ConnectionTrait>(
    conn: &C,
    config_id: i32,
) -> Result<Option<data_config::Model>> {
    data_config::Entity::find()
        .filter(data_config::Column::ConfigId.eq(config_id))
        .order_by_desc(data_config::Column::Version)
        .one(conn)
        .await
        .map_err(store_err)
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> Result<()> {
        self.db.ping().await.map_err(store_err)
    }
}

// ============================================================================
// ConfigPersistence implementation
// ============================================================================

#[async_trait]
impl ConfigPersistence for ExternalDbPersistService {
    async fn config_create(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig> {
        let payload = data.encode()?;
        let txn = self.db.begin().await.map_err(store_err)?;

        let meta = config::ActiveModel {
            service: Set(service.to_string()),
            ..Default::default()
        };
        let config_id = match config::Entity::insert(meta).exec(&txn).await {
            Ok(res) => res.last_insert_id,
            Err(e) if is_unique_violation(&e) => {
                warn!(service, "Rejected create for existing config");
                return Err(VersoError::AlreadyExists(service.to_string()));
            }
            Err(e) => return Err(store_err(e)),
        };

        let first = data_config::ActiveModel {
            config_id: Set(config_id),
            version: Set(INITIAL_VERSION as i32),
            data: Set(payload),
        };
        data_config::Entity::insert(first)
            .exec_without_returning(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        debug!(service, config_id, "Config created");
        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version: INITIAL_VERSION,
            data: data.clone(),
        })
    }

    async fn config_read(&self, service: &str, version: Option<u32>) -> Result<ServiceConfig> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let config_id = find_config_id(&txn, service)
            .await?
            .ok_or_else(|| VersoError::NotFound(service.to_string()))?;

        let row = match version {
            // A config stripped of all versions reads like a missing one
            None => latest_row(&txn, config_id)
                .await?
                .ok_or_else(|| VersoError::NotFound(service.to_string()))?,
            Some(v) => {
                let not_found = || VersoError::VersionNotFound(service.to_string(), v);
                let db_version = i32::try_from(v).map_err(|_| not_found())?;
                data_config::Entity::find_by_id((config_id, db_version))
                    .one(&txn)
                    .await
                    .map_err(store_err)?
                    .ok_or_else(not_found)?
            }
        };

        txn.commit().await.map_err(store_err)?;

        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version: from_db_version(row.version)?,
            data: ConfigData::decode(&row.data)?,
        })
    }

    async fn config_update(&self, service: &str, data: &ConfigData) -> Result<ServiceConfig> {
        let payload = data.encode()?;
        let (config_id, version) =
            retry_on_version_conflict(service, || self.try_update(service, &payload)).await?;

        debug!(service, config_id, version, "Config updated");
        Ok(ServiceConfig {
            id: config_id,
            service: service.to_string(),
            version,
            data: data.clone(),
        })
    }

    async fn config_delete(&self, service: &str, version: Option<u32>) -> Result<DeletedConfig> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let config_id = lock_config_id(&txn, service)
            .await?
            .ok_or_else(|| VersoError::NotFound(service.to_string()))?;

        match version {
            None => {
                let removed = data_config::Entity::delete_many()
                    .filter(data_config::Column::ConfigId.eq(config_id))
                    .exec(&txn)
                    .await
                    .map_err(store_err)?;
                config::Entity::delete_by_id(config_id)
                    .exec(&txn)
                    .await
                    .map_err(store_err)?;
                debug!(
                    service,
                    config_id,
                    versions = removed.rows_affected,
                    "Config deleted"
                );
            }
            Some(v) => {
                let not_found = || VersoError::VersionNotFound(service.to_string(), v);
                let db_version = i32::try_from(v).map_err(|_| not_found())?;
                let removed = data_config::Entity::delete_by_id((config_id, db_version))
                    .exec(&txn)
                    .await
                    .map_err(store_err)?;
                if removed.rows_affected == 0 {
                    return Err(not_found());
                }
                debug!(service, config_id, version = v, "Config version deleted");
            }
        }

        txn.commit().await.map_err(store_err)?;

        Ok(DeletedConfig {
            id: config_id,
            service: service.to_string(),
            version,
        })
    }

    async fn config_versions(&self, service: &str) -> Result<Vec<u32>> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let config_id = find_config_id(&txn, service)
            .await?
            .ok_or_else(|| VersoError::NotFound(service.to_string()))?;

        let versions = data_config::Entity::find()
            .select_only()
            .column(data_config::Column::Version)
            .filter(data_config::Column::ConfigId.eq(config_id))
            .order_by_asc(data_config::Column::Version)
            .into_tuple::<i32>()
            .all(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        versions.into_iter().map(from_db_version).collect()
    }
}
