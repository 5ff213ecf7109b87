// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The subcommands mirror the command lines of the external tools, so
//! `swbridge vis chassis hide` runs `<exe> vis chassis hide`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{MarkerTarget, SuspensionTarget, Visibility};

/// Command-line arguments for `swbridge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "swbridge",
    version,
    about = "Drive the SolidWorks suspension tools with live progress and abort.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Swbridge.toml` in the current working directory; a missing
    /// default file means built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SWBRIDGE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the tool invocations, but don't execute them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Hardpoint insertion and poses.
    #[command(subcommand)]
    Hardpoints(HardpointsCommand),

    /// Show or hide suspension components.
    Vis(VisArgs),

    /// Marker operations.
    #[command(subcommand)]
    Marker(MarkerCommand),

    /// Draw suspension coordinate systems with the legacy CoordinateRunner.
    #[command(subcommand)]
    Draw(DrawCommand),

    /// Create a single coordinate system with the legacy CoordinateRunner.
    Coord(CoordArgs),

    /// Release whatever state the host application still holds.
    Release,

    /// Manage and apply visualization profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum HardpointsCommand {
    /// Insert markers and coordinate systems for every hardpoint.
    Add {
        json: PathBuf,
        /// Marker part (`.sldprt`); defaults to `[paths].marker_part`.
        marker: Option<PathBuf>,
    },
    /// Create a named pose.
    Pose { json: PathBuf, pose: String },
}

#[derive(Debug, Clone, Args)]
pub struct VisArgs {
    /// all, front, rear, front_wheels, rear_wheels, wheels, chassis,
    /// non_chassis, substring, feature
    pub target: SuspensionTarget,
    /// show or hide
    pub visibility: Visibility,
    /// Filter text for `substring` and `feature`.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum MarkerCommand {
    /// Show or hide markers.
    Vis(MarkerVisArgs),
}

#[derive(Debug, Clone, Args)]
pub struct MarkerVisArgs {
    /// all, front, rear, name
    pub target: MarkerTarget,
    /// show or hide
    pub visibility: Visibility,
    /// Filter text for `name`.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DrawCommand {
    /// Front suspension only.
    Front { front: PathBuf },
    /// Rear suspension, offset by the vehicle setup's reference distance.
    Rear { rear: PathBuf, vehicle_setup: PathBuf },
    /// Front and rear.
    Full {
        front: PathBuf,
        rear: PathBuf,
        vehicle_setup: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CoordArgs {
    pub name: String,
    #[arg(allow_negative_numbers = true)]
    pub x: f64,
    #[arg(allow_negative_numbers = true)]
    pub y: f64,
    #[arg(allow_negative_numbers = true)]
    pub z: f64,
    /// Optional rotation angles in degrees: X Y Z.
    #[arg(allow_negative_numbers = true, num_args = 0..=3)]
    pub angles: Vec<f64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    /// List saved profiles.
    List,
    /// Print a saved profile.
    Show { name: String },
    /// Save a profile from explicit settings.
    Save {
        name: String,
        /// Suspension setting, e.g. `chassis=hide`. Repeatable.
        #[arg(long, value_name = "TARGET=show|hide", value_parser = parse_setting)]
        suspension: Vec<(String, bool)>,
        /// Marker setting, e.g. `front=show`. Repeatable.
        #[arg(long, value_name = "TARGET=show|hide", value_parser = parse_setting)]
        marker: Vec<(String, bool)>,
        /// Substring category, e.g. `CHAS_=show`. Repeatable.
        #[arg(long, value_name = "FILTER=show|hide", value_parser = parse_setting)]
        category: Vec<(String, bool)>,
    },
    /// Apply a saved profile.
    Apply { name: String },
}

/// Parse `key=show|hide` into `(key, visible)`.
pub fn parse_setting(s: &str) -> Result<(String, bool), String> {
    let (key, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KEY=show|hide, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    let visibility: Visibility = value.parse()?;
    Ok((key.to_string(), visibility == Visibility::Show))
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
