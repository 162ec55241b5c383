//! Startup schema bootstrap
//!
//! Creates the repository tables from the entity definitions when they are
//! missing. Existing tables are left untouched.

use sea_orm::{ConnectionTrait, DbErr, EntityName, Schema};
use tracing::info;

use crate::entity::{config, data_config};

/// Create `configs` and `data_configs` if they do not exist yet.
pub async fn ensure_schema<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let configs = schema
        .create_table_from_entity(config::Entity)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&configs)).await?;

    let data_configs = schema
        .create_table_from_entity(data_config::Entity)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&data_configs)).await?;

    info!(
        tables = ?[config::Entity.table_name(), data_config::Entity.table_name()],
        "Config repository schema ready"
    );
    Ok(())
}
