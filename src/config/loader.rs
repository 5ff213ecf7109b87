// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Config, RawConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for a
/// usable [`Config`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = load_from_path(&path)?;
    let config = Config::try_from(raw_config)?;
    Ok(config)
}

/// Load the config the CLI points at.
///
/// A missing file at the *default* location yields the built-in defaults; a
/// missing file that was asked for explicitly is an error.
pub fn load_or_default(path: impl AsRef<Path>, explicit: bool) -> Result<Config> {
    let path = path.as_ref();
    if !explicit && !path.exists() {
        debug!(path = %path.display(), "no config file found; using defaults");
        return Ok(Config::default());
    }
    load_and_validate(path)
}

/// Default config location: `Swbridge.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Swbridge.toml")
}
