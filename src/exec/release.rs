// src/exec/release.rs

//! Best-effort `release` call issued after an aborted run.
//!
//! An aborted tool may leave the host CAD application inside a command or
//! edit mode. Running `<exe> release` asks the tool to back out of it.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

/// Where and how to run the release command.
#[derive(Debug, Clone)]
pub struct ReleaseCall {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ReleaseCall {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Run `<program> release` and wait for it, bounded by `timeout`.
    ///
    /// Returns the tool's message on success. Any failure (spawn error,
    /// timeout, nonzero exit) is an `Err` carrying the best message found.
    pub async fn run(&self) -> Result<String> {
        info!(program = %self.program.display(), "releasing host application state");

        let mut cmd = Command::new(&self.program);
        cmd.arg("release")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning '{} release'", self.program.display()))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.context("waiting for release command")?,
            Err(_) => bail!(
                "release timed out after {} ms",
                self.timeout.as_millis()
            ),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);

        let message = if !stdout.is_empty() {
            stdout
        } else if !stderr.is_empty() {
            stderr
        } else {
            format!("release exited with code {code}")
        };

        debug!(exit_code = code, %message, "release finished");

        if output.status.success() {
            Ok(message)
        } else {
            bail!(message)
        }
    }
}
