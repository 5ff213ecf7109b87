// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use std::path::PathBuf;

use swbridge::config::{Config, RawConfig};

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfig::default(),
        }
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.executable = Some(path.into());
        self
    }

    pub fn coordinate_runner(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.coordinate_runner = Some(path.into());
        self
    }

    pub fn search_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.search_root = path.into();
        self
    }

    pub fn grace_period_ms(mut self, ms: u64) -> Self {
        self.config.abort.grace_period_ms = ms;
        self
    }

    pub fn release_on_abort(mut self, val: bool) -> Self {
        self.config.abort.release_on_abort = val;
        self
    }

    pub fn release_timeout_ms(mut self, ms: u64) -> Self {
        self.config.abort.release_timeout_ms = ms;
        self
    }

    pub fn marker_part(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.marker_part = Some(path.into());
        self
    }

    pub fn profiles_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.profiles_dir = path.into();
        self
    }

    pub fn raw(self) -> RawConfig {
        self.config
    }

    pub fn build(self) -> Config {
        Config::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
