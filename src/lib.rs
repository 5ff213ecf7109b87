// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod ops;
pub mod presenter;
pub mod protocol;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command, DrawCommand, HardpointsCommand, MarkerCommand, ProfileCommand};
use crate::config::{Config, default_config_path, load_or_default};
use crate::exec::{BackgroundExecutor, ReleaseCall, RunResult, RunnerOptions};
use crate::ops::profiles::ProfileSettings;
use crate::ops::{
    ApplyProfile, CoordinateSystem, CreatePose, DrawSuspension, InsertCoordinateSystem,
    InsertHardpoints, Operation, Profile, ProfileStore, ReleaseHostState, SetVisibility,
    SuspensionSet, ToolPaths, VisibilityCommand,
};

/// Process exit code of an aborted run (as after SIGINT).
pub const EXIT_ABORTED: i32 = 130;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - operation construction and executable discovery
/// - background executor + terminal presenter
/// - Ctrl-C handling
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(config_path(&args), args.config.is_some())?;
    let tools = ToolPaths::from_config(&cfg);

    let operation = match build_operation(&args.command, &cfg, &tools)? {
        Some(op) => op,
        None => return Ok(0),
    };

    if args.dry_run {
        print_dry_run(operation.as_ref())?;
        return Ok(0);
    }

    let (executor, events) = BackgroundExecutor::new(runner_options(&cfg, &tools));

    // Ctrl-C -> abort. Further presses are harmless.
    let ctrl_c = {
        let executor = executor.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
                executor.abort();
            }
        })
    };

    let _run = executor.run(operation)?;
    let result = presenter::present(events, std::io::stdout()).await?;
    ctrl_c.abort();

    Ok(exit_code(result.as_ref()))
}

/// Map a terminal result onto a process exit code.
pub fn exit_code(result: Option<&RunResult>) -> i32 {
    match result {
        Some(r) if r.succeeded => 0,
        Some(r) if r.is_aborted() => EXIT_ABORTED,
        _ => 1,
    }
}

fn runner_options(cfg: &Config, tools: &ToolPaths) -> RunnerOptions {
    let release = if cfg.abort.release_on_abort {
        match tools.suspension_tools() {
            Ok(exe) => Some(ReleaseCall::new(exe, cfg.release_timeout())),
            Err(e) => {
                debug!(error = %e, "release after abort disabled");
                None
            }
        }
    } else {
        None
    };

    RunnerOptions {
        grace_period: cfg.grace_period(),
        release,
    }
}

/// Turn a subcommand into an operation.
///
/// Profile housekeeping (`list`, `show`, `save`) happens right here and
/// yields `None`: there is nothing to run.
pub fn build_operation(
    command: &Command,
    cfg: &Config,
    tools: &ToolPaths,
) -> Result<Option<Arc<dyn Operation>>> {
    let op: Arc<dyn Operation> = match command {
        Command::Hardpoints(HardpointsCommand::Add { json, marker }) => {
            let marker_path = match marker.clone().or_else(|| cfg.paths.marker_part.clone()) {
                Some(path) => path,
                None => bail!("no marker part given and [paths].marker_part is not set"),
            };
            Arc::new(InsertHardpoints {
                executable: tools.suspension_tools()?,
                json_path: json.clone(),
                marker_path,
            })
        }
        Command::Hardpoints(HardpointsCommand::Pose { json, pose }) => Arc::new(CreatePose {
            executable: tools.suspension_tools()?,
            json_path: json.clone(),
            pose_name: pose.clone(),
        }),
        Command::Vis(v) => Arc::new(SetVisibility {
            executable: tools.suspension_tools()?,
            command: VisibilityCommand::Suspension {
                target: v.target,
                visibility: v.visibility,
                filter: v.filter.clone(),
            },
        }),
        Command::Marker(MarkerCommand::Vis(v)) => Arc::new(SetVisibility {
            executable: tools.suspension_tools()?,
            command: VisibilityCommand::Marker {
                target: v.target,
                visibility: v.visibility,
                filter: v.filter.clone(),
            },
        }),
        Command::Draw(draw) => Arc::new(DrawSuspension {
            runner: tools.coordinate_runner()?,
            set: suspension_set(draw),
        }),
        Command::Coord(c) => {
            let angles = match c.angles.as_slice() {
                [] => [0.0; 3],
                [ax, ay, az] => [*ax, *ay, *az],
                other => bail!("expected 0 or 3 angles, got {}", other.len()),
            };
            Arc::new(InsertCoordinateSystem {
                runner: tools.coordinate_runner()?,
                system: CoordinateSystem {
                    name: c.name.clone(),
                    origin: [c.x, c.y, c.z],
                    angles,
                },
            })
        }
        Command::Release => Arc::new(ReleaseHostState {
            executable: tools.suspension_tools()?,
        }),
        Command::Profile(profile) => {
            let store = ProfileStore::new(&cfg.paths.profiles_dir);
            return match profile {
                ProfileCommand::Apply { name } => Ok(Some(Arc::new(ApplyProfile {
                    executable: tools.suspension_tools()?,
                    profile: store.load(name)?,
                }))),
                other => {
                    manage_profiles(&store, other)?;
                    Ok(None)
                }
            };
        }
    };
    Ok(Some(op))
}

fn suspension_set(draw: &DrawCommand) -> SuspensionSet {
    match draw.clone() {
        DrawCommand::Front { front } => SuspensionSet::Front { front },
        DrawCommand::Rear {
            rear,
            vehicle_setup,
        } => SuspensionSet::Rear {
            rear,
            vehicle_setup,
        },
        DrawCommand::Full {
            front,
            rear,
            vehicle_setup,
        } => SuspensionSet::Full {
            front,
            rear,
            vehicle_setup,
        },
    }
}

fn manage_profiles(store: &ProfileStore, command: &ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("no profiles in {}", store.dir().display());
            }
            for name in names {
                println!("{name}");
            }
        }
        ProfileCommand::Show { name } => {
            let profile = store.load(name)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileCommand::Save {
            name,
            suspension,
            marker,
            category,
        } => {
            let settings = ProfileSettings {
                suspension: suspension.iter().cloned().collect(),
                markers: marker.iter().cloned().collect(),
                categories: category.iter().cloned().collect(),
            };
            let profile = Profile::new(name.clone(), settings);
            // Reject unknown targets before anything is written.
            profile.commands()?;
            let path = store.save(&profile)?;
            info!(profile = %name, "profile saved");
            println!("saved profile '{name}' to {}", path.display());
        }
        ProfileCommand::Apply { .. } => {}
    }
    Ok(())
}

/// Print the invocations an operation would issue.
fn print_dry_run(operation: &dyn Operation) -> Result<()> {
    println!("swbridge dry-run ({})", operation.kind());
    for invocation in operation.plan()? {
        println!("  {invocation}");
    }
    debug!("dry-run complete (no execution)");
    Ok(())
}

/// The config file `--config` points at, or the default location.
pub fn config_path(args: &CliArgs) -> PathBuf {
    args.config.clone().unwrap_or_else(default_config_path)
}
