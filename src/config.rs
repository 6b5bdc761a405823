// src/config.rs

//! Configuration loading helpers.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load configuration from a TOML file, validating it.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration, falling back to validated defaults when the file is
/// missing or malformed.
pub fn load_or_default(path: &Path) -> Config {
    if path.exists() {
        Config::load_or_default(path)
    } else {
        log::debug!("No config file at {:?}, using defaults", path);
        Config::default()
    }
}
