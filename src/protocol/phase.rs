// src/protocol/phase.rs

//! Execution phases announced by `STATE:<token>` lines.

use std::str::FromStr;

use crate::types::OperationKind;

/// One named phase of the external executable.
///
/// Tokens outside the known vocabulary are kept as [`Phase::Unrecognized`]
/// and displayed verbatim. No transition order is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    LoadingJson,
    LoadingMarkerPart,
    InsertingBodies,
    RenamingBodies,
    ApplyingColors,
    CreatingCoordinateSystems,
    CreatingHardpointsFolder,
    CreatingTransformsFolder,
    CreatingTransforms,
    UpdatingSuppression,
    UpdatingVisibility,
    Rebuilding,
    ScanningCoordSystems,
    InsertingComponents,
    MatingMarkers,
    PostProcessing,
    Cleanup,
    Complete,
    Unrecognized(String),
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(Phase::from_token(token))
    }
}

impl Phase {
    /// Map a raw token onto the vocabulary. Matching is case-sensitive.
    pub fn from_token(token: &str) -> Self {
        match token {
            "Initializing" => Phase::Initializing,
            "LoadingJson" => Phase::LoadingJson,
            "LoadingMarkerPart" => Phase::LoadingMarkerPart,
            "InsertingBodies" => Phase::InsertingBodies,
            "RenamingBodies" => Phase::RenamingBodies,
            "ApplyingColors" => Phase::ApplyingColors,
            "CreatingCoordinateSystems" => Phase::CreatingCoordinateSystems,
            "CreatingHardpointsFolder" => Phase::CreatingHardpointsFolder,
            "CreatingTransformsFolder" => Phase::CreatingTransformsFolder,
            "CreatingTransforms" => Phase::CreatingTransforms,
            "UpdatingSuppression" => Phase::UpdatingSuppression,
            "UpdatingVisibility" => Phase::UpdatingVisibility,
            "Rebuilding" => Phase::Rebuilding,
            "ScanningCoordSystems" => Phase::ScanningCoordSystems,
            "InsertingComponents" => Phase::InsertingComponents,
            "MatingMarkers" => Phase::MatingMarkers,
            "PostProcessing" => Phase::PostProcessing,
            "Cleanup" => Phase::Cleanup,
            "Complete" => Phase::Complete,
            other => Phase::Unrecognized(other.to_string()),
        }
    }

    /// Human-readable phrase for this phase.
    ///
    /// `Initializing` and `Complete` are worded per operation kind; every
    /// other phrase is shared.
    pub fn describe(&self, kind: OperationKind) -> String {
        let phrase = match self {
            Phase::Initializing => match kind {
                OperationKind::CoordinateInsertion => "Starting coordinate insertion...",
                OperationKind::PoseCreation => "Starting pose creation...",
                OperationKind::Visualization => "Starting visualization control...",
                OperationKind::ProfileApplication => "Applying visualization profile...",
                OperationKind::CoordinateSystems => "Starting coordinate system creation...",
                OperationKind::Release => "Starting release...",
            },
            Phase::Complete => match kind {
                OperationKind::CoordinateInsertion => "Coordinate insertion complete",
                OperationKind::PoseCreation => "Pose creation complete",
                OperationKind::Visualization => "Visualization control complete",
                OperationKind::ProfileApplication => "Profile applied",
                OperationKind::CoordinateSystems => "Coordinate system creation complete",
                OperationKind::Release => "Release complete",
            },
            Phase::LoadingJson => "Loading JSON data...",
            Phase::LoadingMarkerPart => "Loading marker part...",
            Phase::InsertingBodies => "Inserting marker bodies...",
            Phase::RenamingBodies => "Renaming bodies...",
            Phase::ApplyingColors => "Applying colors...",
            Phase::CreatingCoordinateSystems => "Creating coordinate systems...",
            Phase::CreatingHardpointsFolder => "Creating Hardpoints folder...",
            Phase::CreatingTransformsFolder => "Creating Transforms folder...",
            Phase::CreatingTransforms => "Creating transform features...",
            Phase::UpdatingSuppression => "Updating suppression states...",
            Phase::UpdatingVisibility => "Updating visibility...",
            Phase::Rebuilding => "Rebuilding model...",
            Phase::ScanningCoordSystems => "Scanning coordinate systems...",
            Phase::InsertingComponents => "Inserting marker components...",
            Phase::MatingMarkers => "Mating markers...",
            Phase::PostProcessing => "Post-processing...",
            Phase::Cleanup => "Cleaning up...",
            Phase::Unrecognized(token) => return token.clone(),
        };
        phrase.to_string()
    }
}
