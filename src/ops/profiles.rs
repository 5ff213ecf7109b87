// src/ops/profiles.rs

//! Named visualization profiles stored as JSON files.
//!
//! ```json
//! {
//!   "name": "chassis-only",
//!   "settings": {
//!     "suspension": { "all": false },
//!     "markers": { "front": true },
//!     "categories": { "CHAS_": true }
//!   },
//!   "created": "2024-05-01T12:00:00+02:00"
//! }
//! ```
//!
//! `categories` keys are substring filters applied with `vis substring`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, SwBridgeError};
use crate::types::{MarkerTarget, SuspensionTarget, Visibility};

use super::visibility::VisibilityCommand;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub settings: ProfileSettings,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default)]
    pub suspension: BTreeMap<String, bool>,
    #[serde(default)]
    pub markers: BTreeMap<String, bool>,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
}

impl Profile {
    /// New profile stamped with the current local time.
    pub fn new(name: impl Into<String>, settings: ProfileSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            created: chrono::Local::now().to_rfc3339(),
        }
    }

    /// Visibility commands in application order: suspension targets, then
    /// markers, then categories.
    pub fn commands(&self) -> Result<Vec<VisibilityCommand>> {
        let mut commands = Vec::new();

        for (target, visible) in &self.settings.suspension {
            let target: SuspensionTarget = target.parse().map_err(SwBridgeError::InvalidInput)?;
            commands.push(VisibilityCommand::Suspension {
                target,
                visibility: Visibility::from(*visible),
                filter: None,
            });
        }

        for (target, visible) in &self.settings.markers {
            let target: MarkerTarget = target.parse().map_err(SwBridgeError::InvalidInput)?;
            commands.push(VisibilityCommand::Marker {
                target,
                visibility: Visibility::from(*visible),
                filter: None,
            });
        }

        for (filter, visible) in &self.settings.categories {
            commands.push(VisibilityCommand::Suspension {
                target: SuspensionTarget::Substring,
                visibility: Visibility::from(*visible),
                filter: Some(filter.clone()),
            });
        }

        Ok(commands)
    }
}

/// Directory of `<name>.json` profile files.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_profile_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// Write `profile`, replacing any profile with the same name.
    pub fn save(&self, profile: &Profile) -> Result<PathBuf> {
        let path = self.path_for(&profile.name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(profile)?)?;
        debug!(path = %path.display(), "saved visualization profile");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Profile> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(SwBridgeError::InvalidInput(format!(
                "Profile '{name}' not found"
            )));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Names of all stored profiles, sorted. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_profile_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name == "..";
    if bad {
        return Err(SwBridgeError::InvalidInput(format!(
            "invalid profile name '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProfileSettings {
        let mut s = ProfileSettings::default();
        s.suspension.insert("front_wheels".into(), false);
        s.markers.insert("rear".into(), true);
        s.categories.insert("CHAS_".into(), true);
        s
    }

    #[test]
    fn commands_follow_profile_sections() {
        let profile = Profile::new("p", settings());
        let rendered: Vec<String> = profile
            .commands()
            .unwrap()
            .iter()
            .map(|c| c.invocation("t").to_string())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "t vis frontwheels hide",
                "t marker vis rear show",
                "t vis substring show CHAS_",
            ]
        );
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut s = ProfileSettings::default();
        s.markers.insert("sideways".into(), true);
        assert!(Profile::new("p", s).commands().is_err());
    }

    #[test]
    fn store_saves_lists_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles"));
        assert!(store.list().unwrap().is_empty());

        let profile = Profile::new("chassis", settings());
        store.save(&profile).unwrap();
        store.save(&Profile::new("all", ProfileSettings::default())).unwrap();

        assert_eq!(store.list().unwrap(), vec!["all", "chassis"]);
        assert_eq!(store.load("chassis").unwrap(), profile);
    }

    #[test]
    fn missing_profile_and_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        match store.load("ghost") {
            Err(SwBridgeError::InvalidInput(msg)) => assert_eq!(msg, "Profile 'ghost' not found"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(store.load("../etc").is_err());
    }
}
