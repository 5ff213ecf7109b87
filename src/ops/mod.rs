// src/ops/mod.rs

//! Concrete operations the front-end can launch.
//!
//! Every operation implements [`Operation`]: it reports its
//! [`OperationKind`] and runs against a [`RunContext`], which carries the
//! output sink, progress counters and abort flag. Operations never print;
//! everything user-visible goes through the context.
//!
//! - [`hardpoints`]: `hardpoints add` / `hardpoints pose`
//! - [`visibility`]: `vis` / `marker vis`, and profile application
//! - [`profiles`]: on-disk visualization profiles
//! - [`coordinates`]: legacy per-item coordinate-system creation
//! - [`release`]: standalone release of the host application state
//! - [`locate`]: finding the external executables

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::{Invocation, RunContext};
use crate::types::OperationKind;

pub mod coordinates;
pub mod hardpoints;
pub mod locate;
pub mod profiles;
pub mod release;
pub mod visibility;

pub use coordinates::{CoordinateSystem, DrawSuspension, InsertCoordinateSystem, SuspensionSet};
pub use hardpoints::{CreatePose, InsertHardpoints};
pub use locate::ToolPaths;
pub use profiles::{Profile, ProfileStore};
pub use release::ReleaseHostState;
pub use visibility::{ApplyProfile, SetVisibility, VisibilityCommand};

/// Future returned by [`Operation::run`]; resolves to the exit code.
pub type OperationFuture<'a> = Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;

/// A unit of work the runner can execute.
pub trait Operation: Send + Sync {
    fn kind(&self) -> OperationKind;

    /// Do the work. `Ok(0)` is success, any other code is a failed command,
    /// `Err` is a failure with a message (bad input, launch failure, ...).
    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a>;

    /// The invocations this operation would issue, for `--dry-run`.
    fn plan(&self) -> Result<Vec<Invocation>>;
}
