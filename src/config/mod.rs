//! Configuration module for bmpack
//!
//! Provides types and parsing for `bmpack.toml` configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::*;
