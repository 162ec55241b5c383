//! Config metadata entity
//!
//! One row per service; `service` carries the uniqueness constraint that
//! create relies on to reject duplicates.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub service: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::data_config::Entity")]
    DataConfig,
}

impl Related<super::data_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
