//! Data models module
//!
//! - `constants` - configuration keys and defaults
//! - `config` - command line and layered configuration

pub mod config;
pub mod constants;

pub use config::{Cli, Configuration};
pub use constants::*;
