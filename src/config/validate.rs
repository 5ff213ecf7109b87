// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{Result, SwBridgeError};

impl TryFrom<RawConfig> for Config {
    type Error = SwBridgeError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(Config::new_unchecked(raw))
    }
}

/// Check the invariants a `RawConfig` must satisfy before use.
pub fn validate_config(cfg: &RawConfig) -> Result<()> {
    validate_abort(cfg)?;
    validate_paths(cfg)?;
    Ok(())
}

fn validate_abort(cfg: &RawConfig) -> Result<()> {
    if cfg.abort.grace_period_ms == 0 {
        return Err(SwBridgeError::ConfigError(
            "[abort].grace_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.abort.release_timeout_ms == 0 {
        return Err(SwBridgeError::ConfigError(
            "[abort].release_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfig) -> Result<()> {
    let empty = |p: &std::path::Path| p.as_os_str().is_empty();

    if let Some(exe) = &cfg.tools.executable {
        if empty(exe) {
            return Err(SwBridgeError::ConfigError(
                "[tools].executable must not be empty".to_string(),
            ));
        }
    }
    if let Some(exe) = &cfg.tools.coordinate_runner {
        if empty(exe) {
            return Err(SwBridgeError::ConfigError(
                "[tools].coordinate_runner must not be empty".to_string(),
            ));
        }
    }
    if empty(&cfg.tools.search_root) {
        return Err(SwBridgeError::ConfigError(
            "[tools].search_root must not be empty".to_string(),
        ));
    }
    if empty(&cfg.paths.profiles_dir) {
        return Err(SwBridgeError::ConfigError(
            "[paths].profiles_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
