//! Config version entity
//!
//! Rows are inserted or deleted, never updated. The composite primary key
//! doubles as the `(config_id, version)` uniqueness constraint.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "data_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub config_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: i32,
    /// Canonical payload produced by the config value codec
    pub data: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::config::Entity",
        from = "Column::ConfigId",
        to = "super::config::Column::Id"
    )]
    Config,
}

impl Related<super::config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Config.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
