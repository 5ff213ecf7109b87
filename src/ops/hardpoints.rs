// src/ops/hardpoints.rs

//! `hardpoints add` and `hardpoints pose`.
//!
//! Both hand the parsed suspension JSON to SuspensionTools, which reports
//! back through the line protocol with absolute `PROGRESS:` values.

use std::path::{Path, PathBuf};

use crate::errors::{Result, SwBridgeError};
use crate::exec::{Invocation, RunContext};
use crate::types::OperationKind;

use super::{Operation, OperationFuture};

const INVALID_POSE_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Insert marker bodies and coordinate systems for every hardpoint.
#[derive(Debug, Clone)]
pub struct InsertHardpoints {
    pub executable: PathBuf,
    pub json_path: PathBuf,
    pub marker_path: PathBuf,
}

impl InsertHardpoints {
    /// Check the inputs before anything is launched.
    pub fn validate(&self) -> Result<()> {
        let errors = validate_insert_inputs(&self.json_path, &self.marker_path);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SwBridgeError::InvalidInput(errors.join("; ")))
        }
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.executable)
            .arg("hardpoints")
            .arg("add")
            .arg(self.json_path.to_string_lossy())
            .arg(self.marker_path.to_string_lossy())
    }
}

impl Operation for InsertHardpoints {
    fn kind(&self) -> OperationKind {
        OperationKind::CoordinateInsertion
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            self.validate()?;
            Ok(ctx.run_process(&self.invocation()).await?)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(vec![self.invocation()])
    }
}

/// Create a named pose: coordinate systems plus transform features.
#[derive(Debug, Clone)]
pub struct CreatePose {
    pub executable: PathBuf,
    pub json_path: PathBuf,
    pub pose_name: String,
}

impl CreatePose {
    pub fn validate(&self) -> Result<()> {
        if !self.json_path.exists() {
            return Err(SwBridgeError::InvalidInput(format!(
                "JSON file not found: {}",
                self.json_path.display()
            )));
        }
        validate_pose_name(&self.pose_name)
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.executable)
            .arg("hardpoints")
            .arg("pose")
            .arg(self.json_path.to_string_lossy())
            .arg(self.pose_name.clone())
    }
}

impl Operation for CreatePose {
    fn kind(&self) -> OperationKind {
        OperationKind::PoseCreation
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            self.validate()?;
            Ok(ctx.run_process(&self.invocation()).await?)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(vec![self.invocation()])
    }
}

/// All problems with the inputs of `hardpoints add`, in display order.
pub fn validate_insert_inputs(json_path: &Path, marker_path: &Path) -> Vec<String> {
    let mut errors = Vec::new();

    if !json_path.exists() {
        errors.push(format!("JSON file not found: {}", json_path.display()));
    }
    if !marker_path.exists() {
        errors.push(format!("Marker part not found: {}", marker_path.display()));
    }
    let is_part = marker_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sldprt"));
    if !is_part {
        errors.push("Marker file must be a .sldprt file".to_string());
    }

    errors
}

/// Pose names become CAD feature names, so some characters are off limits.
pub fn validate_pose_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SwBridgeError::InvalidInput(
            "Pose name cannot be empty".to_string(),
        ));
    }
    if let Some(c) = name.chars().find(|c| INVALID_POSE_CHARS.contains(c)) {
        return Err(SwBridgeError::InvalidInput(format!(
            "Pose name cannot contain '{c}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_name_rules() {
        assert!(validate_pose_name("Full Bump").is_ok());
        assert!(validate_pose_name("   ").is_err());
        match validate_pose_name("a:b") {
            Err(SwBridgeError::InvalidInput(msg)) => assert_eq!(msg, "Pose name cannot contain ':'"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn insert_inputs_are_checked() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("front.json");
        let marker = dir.path().join("Marker.SLDPRT");
        std::fs::write(&json, "{}").unwrap();
        std::fs::write(&marker, b"").unwrap();

        assert!(validate_insert_inputs(&json, &marker).is_empty());

        let errors = validate_insert_inputs(&dir.path().join("nope.json"), &json);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("JSON file not found"));
        assert_eq!(errors[1], "Marker file must be a .sldprt file");
    }

    #[test]
    fn invocations_follow_the_command_line_contract() {
        let op = CreatePose {
            executable: PathBuf::from("tool"),
            json_path: PathBuf::from("front.json"),
            pose_name: "Droop".into(),
        };
        assert_eq!(
            op.plan().unwrap()[0].to_string(),
            "tool hardpoints pose front.json Droop"
        );

        let op = InsertHardpoints {
            executable: PathBuf::from("tool"),
            json_path: PathBuf::from("front.json"),
            marker_path: PathBuf::from("Marker.SLDPRT"),
        };
        assert_eq!(
            op.plan().unwrap()[0].to_string(),
            "tool hardpoints add front.json Marker.SLDPRT"
        );
    }
}
