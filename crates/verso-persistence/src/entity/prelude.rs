pub use super::config::Entity as Config;
pub use super::data_config::Entity as DataConfig;
