// src/ops/locate.rs

//! Finding the external executables.
//!
//! An explicitly configured path always wins and is used as-is (it may also
//! be a bare command name resolved through `PATH`). Otherwise the
//! `sw_drawer` build tree under `[tools].search_root` is searched, preferring
//! Release over Debug builds.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::errors::{Result, SwBridgeError};

const TOOL_NAMES: [&str; 2] = ["SuspensionTools.exe", "sw_drawer.exe"];
const CONFIGURATIONS: [&str; 2] = ["Release", "Debug"];
const COORDINATE_RUNNER: &str = "CoordinateRunner.exe";

/// Resolves tool paths from the `[tools]` section.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    executable: Option<PathBuf>,
    coordinate_runner: Option<PathBuf>,
    search_root: PathBuf,
}

impl ToolPaths {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            executable: cfg.tools.executable.clone(),
            coordinate_runner: cfg.tools.coordinate_runner.clone(),
            search_root: cfg.tools.search_root.clone(),
        }
    }

    /// Path of the SuspensionTools executable.
    pub fn suspension_tools(&self) -> Result<PathBuf> {
        if let Some(exe) = &self.executable {
            return Ok(exe.clone());
        }

        let candidates = suspension_tools_candidates(&self.search_root);
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                debug!(path = %found.display(), "located SuspensionTools");
                Ok(found.clone())
            }
            None => Err(SwBridgeError::ExecutableNotFound(format!(
                "SuspensionTools not found; run 'dotnet build -c Release' in the sw_drawer \
                 folder first (searched {} locations, first: {})",
                candidates.len(),
                candidates[0].display()
            ))),
        }
    }

    /// Path of the legacy CoordinateRunner executable.
    pub fn coordinate_runner(&self) -> Result<PathBuf> {
        if let Some(exe) = &self.coordinate_runner {
            return Ok(exe.clone());
        }

        let path = bin_dir(&self.search_root)
            .join("Release")
            .join("net48")
            .join(COORDINATE_RUNNER);
        if path.is_file() {
            Ok(path)
        } else {
            Err(SwBridgeError::ExecutableNotFound(format!(
                "CoordinateRunner not found at {}; run 'dotnet build -c Release' in the \
                 sw_drawer folder first",
                path.display()
            )))
        }
    }
}

fn bin_dir(root: &Path) -> PathBuf {
    root.join("sw_drawer").join("bin")
}

/// Candidate locations for SuspensionTools, most preferred first.
pub fn suspension_tools_candidates(root: &Path) -> Vec<PathBuf> {
    let bin = bin_dir(root);
    let mut candidates = Vec::new();

    for framework in [Some("net48"), None] {
        for configuration in CONFIGURATIONS {
            for name in TOOL_NAMES {
                let mut path = bin.join(configuration);
                if let Some(fw) = framework {
                    path.push(fw);
                }
                path.push(name);
                candidates.push(path);
            }
        }
    }

    candidates
}
