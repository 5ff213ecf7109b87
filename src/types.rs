// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which kind of work an operation performs.
///
/// The kind selects the phase phrases used for `STATE:` lines and the message
/// reported when the run succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `hardpoints add`: insert marker bodies and coordinate systems.
    CoordinateInsertion,
    /// `hardpoints pose`: create a pose (coordinate systems + transforms).
    PoseCreation,
    /// `vis` / `marker vis`.
    Visualization,
    /// Applying a saved visualization profile.
    ProfileApplication,
    /// Legacy per-item coordinate-system creation.
    CoordinateSystems,
    /// Standalone `release` of the host application's command state.
    Release,
}

impl OperationKind {
    /// Message carried by a successful `RunResult`.
    pub fn completion_message(self) -> &'static str {
        match self {
            OperationKind::CoordinateInsertion => "Coordinate insertion completed successfully",
            OperationKind::PoseCreation => "Pose creation completed successfully",
            OperationKind::Visualization => "Visualization control completed successfully",
            OperationKind::ProfileApplication => "Profile applied successfully",
            OperationKind::CoordinateSystems => "Coordinate systems created successfully",
            OperationKind::Release => "Release completed successfully",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::CoordinateInsertion => "coordinate-insertion",
            OperationKind::PoseCreation => "pose-creation",
            OperationKind::Visualization => "visualization",
            OperationKind::ProfileApplication => "profile-application",
            OperationKind::CoordinateSystems => "coordinate-systems",
            OperationKind::Release => "release",
        };
        f.write_str(s)
    }
}

/// `show` / `hide` argument of the visibility commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Show,
    Hide,
}

impl Visibility {
    pub fn as_arg(self) -> &'static str {
        match self {
            Visibility::Show => "show",
            Visibility::Hide => "hide",
        }
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Show
        } else {
            Visibility::Hide
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "show" => Ok(Visibility::Show),
            "hide" => Ok(Visibility::Hide),
            other => Err(format!(
                "invalid visibility: {other} (expected \"show\" or \"hide\")"
            )),
        }
    }
}

/// Target of a suspension `vis` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionTarget {
    All,
    Front,
    Rear,
    FrontWheels,
    RearWheels,
    Wheels,
    Chassis,
    NonChassis,
    /// Every component whose name contains the filter text.
    Substring,
    /// A single named feature.
    Feature,
}

impl SuspensionTarget {
    /// Token understood by the external executable.
    pub fn as_arg(self) -> &'static str {
        match self {
            SuspensionTarget::All => "all",
            SuspensionTarget::Front => "front",
            SuspensionTarget::Rear => "rear",
            SuspensionTarget::FrontWheels => "frontwheels",
            SuspensionTarget::RearWheels => "rearwheels",
            SuspensionTarget::Wheels => "wheels",
            SuspensionTarget::Chassis => "chassis",
            SuspensionTarget::NonChassis => "nonchassis",
            SuspensionTarget::Substring => "substring",
            SuspensionTarget::Feature => "feature",
        }
    }

    /// Whether the command is meaningless without filter text.
    pub fn requires_filter(self) -> bool {
        matches!(self, SuspensionTarget::Substring | SuspensionTarget::Feature)
    }
}

impl FromStr for SuspensionTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SuspensionTarget::All),
            "front" => Ok(SuspensionTarget::Front),
            "rear" => Ok(SuspensionTarget::Rear),
            "front_wheels" | "frontwheels" => Ok(SuspensionTarget::FrontWheels),
            "rear_wheels" | "rearwheels" => Ok(SuspensionTarget::RearWheels),
            "wheels" => Ok(SuspensionTarget::Wheels),
            "chassis" => Ok(SuspensionTarget::Chassis),
            "non_chassis" | "nonchassis" => Ok(SuspensionTarget::NonChassis),
            "substring" => Ok(SuspensionTarget::Substring),
            "feature" => Ok(SuspensionTarget::Feature),
            other => Err(format!("invalid suspension target: {other}")),
        }
    }
}

/// Target of a `marker vis` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTarget {
    All,
    Front,
    Rear,
    /// Markers whose name contains the filter text.
    Name,
}

impl MarkerTarget {
    pub fn as_arg(self) -> &'static str {
        match self {
            MarkerTarget::All => "all",
            MarkerTarget::Front => "front",
            MarkerTarget::Rear => "rear",
            MarkerTarget::Name => "name",
        }
    }
}

impl FromStr for MarkerTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(MarkerTarget::All),
            "front" => Ok(MarkerTarget::Front),
            "rear" => Ok(MarkerTarget::Rear),
            "name" => Ok(MarkerTarget::Name),
            other => Err(format!("invalid marker target: {other}")),
        }
    }
}
