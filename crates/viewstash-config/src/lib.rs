//! Configuration for the viewstash view state store.
//!
//! Provides TOML-based configuration with:
//! - `[view_state]`: snapshots retained per logical view, compression level
//! - `[logging]`: console filter, JSON output, optional rolling log directory
//! - Config file layering (user config, then project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, Layer, LoadedConfig, load_config, load_config_file, load_config_from,
    user_config_dir,
};
pub use error::{ConfigError, Result};
pub use types::*;
