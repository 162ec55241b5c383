//! SeaORM entity definitions
//!
//! `configs` holds one metadata row per service; `data_configs` holds the
//! immutable version rows keyed by `(config_id, version)`.

pub mod prelude;

pub mod config;
pub mod data_config;
