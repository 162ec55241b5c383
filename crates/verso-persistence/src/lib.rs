//! Verso Persistence - Versioned configuration repository
//!
//! This crate provides:
//! - SeaORM entity definitions for config metadata and version rows
//! - Schema bootstrap for a fresh database
//! - The `ConfigPersistence` protocol and its backends:
//!   external database (SeaORM) and in-memory

pub mod entity;
pub mod memory;
pub mod model;
pub mod schema;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export persistence traits
pub use traits::{ConfigPersistence, PersistenceService};

// Re-export backends
pub use memory::MemoryPersistService;
pub use sql::ExternalDbPersistService;

pub use model::StorageMode;
pub use schema::ensure_schema;
