// src/ops/coordinates.rs

//! Legacy coordinate-system creation.
//!
//! Unlike SuspensionTools, CoordinateRunner creates one coordinate system per
//! invocation and speaks no progress protocol. The drawing operation
//! therefore reports `TOTAL` = number of items and advances the current count
//! by one after each item.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::errors::{Result, SwBridgeError};
use crate::exec::{Invocation, RunContext};
use crate::types::OperationKind;

use super::{Operation, OperationFuture};

const WHEELS_SECTION: &str = "Wheels";
const REFERENCE_DISTANCE: &str = "Reference distance";

/// A named coordinate system: origin plus rotation angles (degrees).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub name: String,
    pub origin: [f64; 3],
    pub angles: [f64; 3],
}

impl CoordinateSystem {
    pub fn at(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            name: name.into(),
            origin: [x, y, z],
            angles: [0.0; 3],
        }
    }

    pub fn invocation(&self, runner: impl Into<PathBuf>) -> Invocation {
        let [x, y, z] = self.origin;
        let [ax, ay, az] = self.angles;
        Invocation::new(runner).arg(self.name.clone()).args(
            [x, y, z, ax, ay, az].iter().map(|v| v.to_string()),
        )
    }
}

/// Coordinate systems pulled out of a suspension file, plus what was skipped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub systems: Vec<CoordinateSystem>,
    pub warnings: Vec<String>,
}

/// Hardpoints of every section except `Wheels`.
///
/// Each section is an object of `point -> [x, y, z, ...]`. Entries that are
/// not arrays of at least three elements are ignored; non-numeric
/// coordinates produce a warning.
pub fn extract_hardpoints(data: &Value, suffix: &str, x_offset: f64) -> Extraction {
    let mut out = Extraction::default();
    let Some(sections) = data.as_object() else {
        return out;
    };

    for (section_name, section) in sections {
        if section_name == WHEELS_SECTION {
            continue;
        }
        let Some(points) = section.as_object() else {
            continue;
        };

        for (point, coords) in points {
            let Some(coords) = coords.as_array().filter(|c| c.len() >= 3) else {
                continue;
            };
            let name = format!("{point}{suffix}");
            match (number(&coords[0]), number(&coords[1]), number(&coords[2])) {
                (Some(x), Some(y), Some(z)) => {
                    out.systems.push(CoordinateSystem::at(name, x + x_offset, y, z));
                }
                _ => out
                    .warnings
                    .push(format!("Error inserting {name}: non-numeric coordinate")),
            }
        }
    }

    out
}

/// Left and right wheel centres, with camber and toe.
///
/// The right wheel mirrors the left one in Y, camber and toe.
pub fn extract_wheels(
    wheels: &Value,
    reference_distance: f64,
    is_rear: bool,
) -> std::result::Result<[CoordinateSystem; 2], String> {
    let param = |key: &str| -> std::result::Result<f64, String> {
        wheels
            .get(key)
            .and_then(|v| v.get("left"))
            .and_then(number)
            .ok_or_else(|| format!("Missing wheel parameter '{key}'"))
    };

    let half_track = param("Half Track")?;
    let tire_diameter = param("Tire Diameter")?;
    let lateral = param("Lateral Offset")?;
    let vertical = param("Vertical Offset")?;
    let longitudinal = param("Longitudinal Offset")?;
    let camber = param("Static Camber")?;
    let toe = param("Static Toe")?;

    let x = reference_distance + longitudinal;
    let y = half_track + lateral;
    let z = tire_diameter / 2.0 + vertical;
    let prefix = if is_rear { "R" } else { "F" };

    Ok([
        CoordinateSystem {
            name: format!("{prefix}L_wheel"),
            origin: [x, y, z],
            angles: [camber, 0.0, toe],
        },
        CoordinateSystem {
            name: format!("{prefix}R_wheel"),
            origin: [x, -y, z],
            angles: [-camber, 0.0, -toe],
        },
    ])
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn load_json(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|e| {
        SwBridgeError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Which half of the car to draw.
#[derive(Debug, Clone)]
pub enum SuspensionSet {
    Front {
        front: PathBuf,
    },
    Rear {
        rear: PathBuf,
        vehicle_setup: PathBuf,
    },
    Full {
        front: PathBuf,
        rear: PathBuf,
        vehicle_setup: PathBuf,
    },
}

/// A titled group of coordinate systems.
#[derive(Debug)]
struct Batch {
    title: &'static str,
    systems: Vec<CoordinateSystem>,
    warnings: Vec<String>,
}

/// Draw suspension hardpoints and wheels with CoordinateRunner, one
/// invocation per coordinate system.
#[derive(Debug, Clone)]
pub struct DrawSuspension {
    pub runner: PathBuf,
    pub set: SuspensionSet,
}

impl DrawSuspension {
    fn batches(&self) -> Result<Vec<Batch>> {
        let mut batches = Vec::new();
        match &self.set {
            SuspensionSet::Front { front } => front_batches(front, &mut batches)?,
            SuspensionSet::Rear {
                rear,
                vehicle_setup,
            } => rear_batches(rear, vehicle_setup, &mut batches)?,
            SuspensionSet::Full {
                front,
                rear,
                vehicle_setup,
            } => {
                front_batches(front, &mut batches)?;
                rear_batches(rear, vehicle_setup, &mut batches)?;
            }
        }
        Ok(batches)
    }
}

fn front_batches(front: &Path, batches: &mut Vec<Batch>) -> Result<()> {
    let data = load_json(front)?;
    push_batches(&data, "_FRONT", 0.0, false, batches);
    Ok(())
}

fn rear_batches(rear: &Path, vehicle_setup: &Path, batches: &mut Vec<Batch>) -> Result<()> {
    let data = load_json(rear)?;
    let setup = load_json(vehicle_setup)?;
    let reference = setup.get(REFERENCE_DISTANCE).and_then(number).unwrap_or(0.0);
    push_batches(&data, "_REAR", reference, true, batches);
    Ok(())
}

fn push_batches(data: &Value, suffix: &str, offset: f64, is_rear: bool, batches: &mut Vec<Batch>) {
    let (hp_title, wheel_title) = if is_rear {
        ("=== Inserting Rear Hardpoints ===", "=== Inserting Rear Wheels ===")
    } else {
        ("=== Inserting Front Hardpoints ===", "=== Inserting Front Wheels ===")
    };

    let hardpoints = extract_hardpoints(data, suffix, offset);
    batches.push(Batch {
        title: hp_title,
        systems: hardpoints.systems,
        warnings: hardpoints.warnings,
    });

    let empty = Value::Object(Default::default());
    let wheels = data.get(WHEELS_SECTION).unwrap_or(&empty);
    let batch = match extract_wheels(wheels, offset, is_rear) {
        Ok(wheels) => Batch {
            title: wheel_title,
            systems: wheels.to_vec(),
            warnings: Vec::new(),
        },
        Err(e) => Batch {
            title: wheel_title,
            systems: Vec::new(),
            warnings: vec![format!("Error: {e}")],
        },
    };
    batches.push(batch);
}

impl Operation for DrawSuspension {
    fn kind(&self) -> OperationKind {
        OperationKind::CoordinateSystems
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            let batches = self.batches()?;
            let total: usize = batches.iter().map(|b| b.systems.len()).sum();
            ctx.set_total(total as u64);

            let mut failed = 0usize;
            for batch in &batches {
                ctx.log(batch.title);
                for warning in &batch.warnings {
                    ctx.log(warning);
                }

                for system in &batch.systems {
                    if ctx.is_aborted() {
                        return Ok(-1);
                    }
                    let outcome = ctx.run_process(&system.invocation(&self.runner)).await;
                    if ctx.is_aborted() {
                        return Ok(-1);
                    }
                    match outcome {
                        Ok(0) => {}
                        Ok(code) => {
                            failed += 1;
                            ctx.log(format!(
                                "Error inserting {}: exit code {code}",
                                system.name
                            ));
                        }
                        Err(e) => {
                            failed += 1;
                            warn!(name = %system.name, error = %e, "coordinate system failed");
                            ctx.log(format!("Error inserting {}: {e:#}", system.name));
                        }
                    }
                    ctx.advance();
                }
            }

            if failed > 0 {
                return Err(SwBridgeError::Other(anyhow::anyhow!(
                    "{failed} of {total} coordinate systems failed"
                )));
            }
            Ok(0)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(self
            .batches()?
            .iter()
            .flat_map(|b| b.systems.iter())
            .map(|s| s.invocation(&self.runner))
            .collect())
    }
}

/// Create one coordinate system directly.
#[derive(Debug, Clone)]
pub struct InsertCoordinateSystem {
    pub runner: PathBuf,
    pub system: CoordinateSystem,
}

impl Operation for InsertCoordinateSystem {
    fn kind(&self) -> OperationKind {
        OperationKind::CoordinateSystems
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            ctx.set_total(1);
            let code = ctx.run_process(&self.system.invocation(&self.runner)).await?;
            ctx.advance();
            Ok(code)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(vec![self.system.invocation(&self.runner)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wheels() -> Value {
        json!({
            "Half Track": {"left": 600.0, "right": 600.0},
            "Tire Diameter": {"left": 500.0},
            "Lateral Offset": {"left": 10.0},
            "Vertical Offset": {"left": 5.0},
            "Longitudinal Offset": {"left": -20.0},
            "Static Camber": {"left": -1.5},
            "Static Toe": {"left": "0.25"}
        })
    }

    #[test]
    fn hardpoints_get_suffix_and_offset() {
        let data = json!({
            "Double A-Arm": {
                "CHAS_upper_front": [100.0, 200.0, 300.0],
                "short": [1.0, 2.0],
                "bad": ["x", 1, 2]
            },
            "Wheels": {"Half Track": {"left": 1.0}},
            "Scalar": 4
        });

        let out = extract_hardpoints(&data, "_REAR", 1500.0);
        assert_eq!(
            out.systems,
            vec![CoordinateSystem::at("CHAS_upper_front_REAR", 1600.0, 200.0, 300.0)]
        );
        assert_eq!(out.warnings, vec!["Error inserting bad_REAR: non-numeric coordinate"]);
    }

    #[test]
    fn wheels_are_mirrored() {
        let [left, right] = extract_wheels(&wheels(), 1000.0, true).unwrap();
        assert_eq!(left.name, "RL_wheel");
        assert_eq!(left.origin, [980.0, 610.0, 255.0]);
        assert_eq!(left.angles, [-1.5, 0.0, 0.25]);
        assert_eq!(right.name, "RR_wheel");
        assert_eq!(right.origin, [980.0, -610.0, 255.0]);
        assert_eq!(right.angles, [1.5, 0.0, -0.25]);
    }

    #[test]
    fn missing_wheel_parameter_is_named() {
        let err = extract_wheels(&json!({}), 0.0, false).unwrap_err();
        assert_eq!(err, "Missing wheel parameter 'Half Track'");
    }

    #[test]
    fn full_plan_uses_reference_distance_for_rear() {
        let dir = tempfile::tempdir().unwrap();
        let front = dir.path().join("front.json");
        let rear = dir.path().join("rear.json");
        let setup = dir.path().join("setup.json");
        fs::write(&front, json!({"A": {"P": [1, 2, 3]}, "Wheels": wheels()}).to_string()).unwrap();
        fs::write(&rear, json!({"A": {"P": [1, 2, 3]}}).to_string()).unwrap();
        fs::write(&setup, json!({"Reference distance": 1550}).to_string()).unwrap();

        let op = DrawSuspension {
            runner: PathBuf::from("runner"),
            set: SuspensionSet::Full {
                front,
                rear,
                vehicle_setup: setup,
            },
        };
        let plan: Vec<String> = op.plan().unwrap().iter().map(|i| i.to_string()).collect();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0], "runner P_FRONT 1 2 3 0 0 0");
        assert!(plan[1].starts_with("runner FL_wheel "));
        assert_eq!(plan[3], "runner P_REAR 1551 2 3 0 0 0");
    }
}
