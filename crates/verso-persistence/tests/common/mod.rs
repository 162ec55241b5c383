//! Shared fixtures for repository tests

use sea_orm::{ConnectOptions, Database};

use verso_common::{ConfigData, Fragment};
use verso_persistence::{ExternalDbPersistService, MemoryPersistService, ensure_schema};

/// SeaORM backend over a private in-memory SQLite database.
///
/// One pooled connection: an in-memory SQLite database lives and dies with
/// its connection.
pub async fn sqlite_store() -> ExternalDbPersistService {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("SQLite connection failed");
    ensure_schema(&db).await.expect("Schema bootstrap failed");
    ExternalDbPersistService::new(db)
}

pub fn memory_store() -> MemoryPersistService {
    MemoryPersistService::new()
}

/// Build config data from one fragment per pair, in the given order.
pub fn data(pairs: &[(&str, &str)]) -> ConfigData {
    ConfigData::from_fragments(pairs.iter().map(|(k, v)| Fragment::new().with(*k, *v)))
        .expect("test data must not repeat keys")
}
