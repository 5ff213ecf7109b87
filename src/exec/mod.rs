// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external tools, using
//! `tokio::process::Command`, and reporting what they print back to the
//! caller as classified events.
//!
//! - [`abort`] holds the cooperative abort flag shared with a running
//!   operation.
//! - [`process`] spawns a child with merged stdout/stderr and terminates it
//!   gracefully.
//! - [`release`] runs the best-effort `release` call after an abort.
//! - [`runner`] drives one operation to exactly one [`RunResult`].
//! - [`executor`] moves a run onto a background task and reports through a
//!   channel, so callers never block on it.

pub mod abort;
pub mod executor;
pub mod process;
pub mod release;
pub mod runner;

pub use abort::AbortHandle;
pub use executor::{BackgroundExecutor, ExecutorEvent};
pub use process::Invocation;
pub use release::ReleaseCall;
pub use runner::{
    ABORTED_MESSAGE, EventListener, ProcessRunner, RunContext, RunResult, RunnerOptions,
};
