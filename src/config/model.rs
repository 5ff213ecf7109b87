// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [tools]
/// executable = "sw_drawer/bin/Release/net48/SuspensionTools.exe"
/// coordinate_runner = "sw_drawer/bin/Release/net48/CoordinateRunner.exe"
/// search_root = "."
///
/// [abort]
/// grace_period_ms = 2000
/// release_on_abort = true
/// release_timeout_ms = 10000
///
/// [paths]
/// marker_part = "Marker.SLDPRT"
/// profiles_dir = "visualization_profiles"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfig {
    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub abort: AbortSection,

    #[serde(default)]
    pub paths: PathsSection,
}

/// `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// Explicit path to the SuspensionTools executable.
    ///
    /// If `None`, the build output under `search_root` is searched.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Explicit path to the legacy CoordinateRunner executable.
    #[serde(default)]
    pub coordinate_runner: Option<PathBuf>,

    /// Directory that contains the `sw_drawer` build tree.
    #[serde(default = "default_search_root")]
    pub search_root: PathBuf,
}

fn default_search_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            executable: None,
            coordinate_runner: None,
            search_root: default_search_root(),
        }
    }
}

/// `[abort]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AbortSection {
    /// How long a terminated process may take to exit before it is killed.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Ask the tool to release the host application's command state after
    /// an aborted run.
    #[serde(default = "default_release_on_abort")]
    pub release_on_abort: bool,

    /// Upper bound for the release call.
    #[serde(default = "default_release_timeout_ms")]
    pub release_timeout_ms: u64,
}

fn default_grace_period_ms() -> u64 {
    2000
}

fn default_release_on_abort() -> bool {
    true
}

fn default_release_timeout_ms() -> u64 {
    10_000
}

impl Default for AbortSection {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
            release_on_abort: default_release_on_abort(),
            release_timeout_ms: default_release_timeout_ms(),
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Marker part used when `hardpoints add` is given no marker.
    #[serde(default)]
    pub marker_part: Option<PathBuf>,

    /// Where visualization profiles are stored.
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: PathBuf,
}

fn default_profiles_dir() -> PathBuf {
    PathBuf::from("visualization_profiles")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            marker_part: None,
            profiles_dir: default_profiles_dir(),
        }
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfig>` (see `validate.rs`) or
/// [`Config::default`].
#[derive(Debug, Clone)]
pub struct Config {
    pub tools: ToolsSection,
    pub abort: AbortSection,
    pub paths: PathsSection,
}

impl Config {
    pub(crate) fn new_unchecked(raw: RawConfig) -> Self {
        Self {
            tools: raw.tools,
            abort: raw.abort,
            paths: raw.paths,
        }
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.abort.grace_period_ms)
    }

    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.abort.release_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new_unchecked(RawConfig::default())
    }
}
