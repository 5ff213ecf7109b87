// src/exec/runner.rs

//! Cancellable runner for a single operation.
//!
//! The runner owns the abort flag, drives one [`Operation`], classifies every
//! output line (from child processes and from the operation itself) through a
//! single [`LineParser`], and turns whatever happens into exactly one
//! [`RunResult`].

use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{debug, info, trace, warn};

use crate::exec::abort::AbortHandle;
use crate::exec::process::{self, Invocation};
use crate::exec::release::ReleaseCall;
use crate::ops::Operation;
use crate::protocol::{LineEvent, LineParser};
use crate::types::OperationKind;

/// Message of every aborted run.
pub const ABORTED_MESSAGE: &str = "Operation aborted";

/// Terminal outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub succeeded: bool,
    pub message: String,
}

impl RunResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }

    pub fn aborted() -> Self {
        Self::failure(ABORTED_MESSAGE)
    }

    pub fn is_aborted(&self) -> bool {
        !self.succeeded && self.message == ABORTED_MESSAGE
    }
}

/// Receives classified events, synchronously and in production order.
pub trait EventListener: Send {
    fn on_event(&mut self, event: LineEvent);
}

impl<F> EventListener for F
where
    F: FnMut(LineEvent) + Send,
{
    fn on_event(&mut self, event: LineEvent) {
        self(event)
    }
}

/// Knobs for the abort path.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Time a terminated child gets before it is killed.
    pub grace_period: Duration,
    /// Release call made after an aborted run that started a process.
    pub release: Option<ReleaseCall>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(2),
            release: None,
        }
    }
}

/// Runs one operation. Discard after use; abort state is never reset.
#[derive(Debug)]
pub struct ProcessRunner {
    abort: AbortHandle,
    options: RunnerOptions,
}

impl ProcessRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            abort: AbortHandle::new(),
            options,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Request cancellation. Safe to call repeatedly and from other tasks.
    pub fn abort(&self) {
        if self.abort.abort() {
            info!("abort requested");
        }
    }

    /// Execute `operation`, forwarding every event to `listener`.
    ///
    /// Never fails: launch errors, nonzero exits and aborts all become a
    /// failed [`RunResult`]. If the abort flag is set when the result is
    /// computed, the run counts as aborted whatever the exit code was.
    pub async fn start<L>(&self, operation: &dyn Operation, listener: L) -> RunResult
    where
        L: EventListener + 'static,
    {
        let kind = operation.kind();

        if self.abort.is_aborted() {
            info!(op = %kind, "abort requested before start; not launching");
            return RunResult::aborted();
        }

        let mut ctx = RunContext::new(
            kind,
            self.abort.clone(),
            self.options.grace_period,
            Box::new(listener),
        );

        info!(op = %kind, "operation started");
        let outcome = operation.run(&mut ctx).await;

        if self.abort.is_aborted() {
            if ctx.launched_process {
                self.release_after_abort(&mut ctx).await;
            }
            info!(op = %kind, "operation aborted");
            return RunResult::aborted();
        }

        match outcome {
            Ok(0) => {
                info!(op = %kind, "operation succeeded");
                RunResult::success(kind.completion_message())
            }
            Ok(code) => {
                info!(op = %kind, exit_code = code, "operation failed");
                RunResult::failure(format!("Command failed with exit code {code}"))
            }
            Err(err) => {
                warn!(op = %kind, error = %err, "operation errored");
                RunResult::failure(format!("{err:#}"))
            }
        }
    }

    async fn release_after_abort(&self, ctx: &mut RunContext) {
        let Some(release) = &self.options.release else {
            return;
        };
        if let Err(err) = release.run().await {
            warn!(error = %err, "failed to release host application state after abort");
            ctx.notice(&format!(
                "Warning: Failed to release host application state after abort: {err:#}"
            ));
        }
    }
}

/// What an [`Operation`] gets to work with while it runs.
///
/// Everything an operation wants to tell the user goes through here, and
/// ends up on the same classified event path as child-process output.
pub struct RunContext {
    kind: OperationKind,
    parser: LineParser,
    abort: AbortHandle,
    grace_period: Duration,
    listener: Box<dyn EventListener>,
    launched_process: bool,
}

impl RunContext {
    fn new(
        kind: OperationKind,
        abort: AbortHandle,
        grace_period: Duration,
        listener: Box<dyn EventListener>,
    ) -> Self {
        Self {
            kind,
            parser: LineParser::new(kind),
            abort,
            grace_period,
            listener,
            launched_process: false,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Report in-process diagnostics. Classified exactly like child output,
    /// so `STATE:`/`TOTAL:`/`PROGRESS:` lines work here too.
    ///
    /// Nothing is forwarded once the run has been aborted.
    pub fn log(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().lines() {
            if let Some(event) = self.parser.classify(line) {
                self.forward(event);
            }
        }
    }

    /// Announce how many items an in-process loop will handle.
    ///
    /// From here on the counters belong to the loop: `TOTAL:`/`PROGRESS:`
    /// lines printed by the per-item child processes are ignored.
    pub fn set_total(&mut self, total: u64) {
        self.parser.lock_counts();
        let event = self.parser.set_total(total);
        self.forward(event);
    }

    /// Mark one more item as done.
    pub fn advance(&mut self) {
        let event = self.parser.advance();
        self.forward(event);
    }

    /// Hand `event` to the listener unless the abort flag is set.
    fn forward(&mut self, event: LineEvent) {
        if self.abort.is_aborted() {
            trace!(?event, "dropping event after abort");
            return;
        }
        self.listener.on_event(event);
    }

    /// Runner-originated message; delivered even after an abort.
    fn notice(&mut self, text: &str) {
        self.listener.on_event(LineEvent::Log(text.to_string()));
    }

    /// Run `invocation` to completion, streaming its output.
    ///
    /// Returns the exit code (`-1` when killed by a signal). If the abort flag
    /// is raised meanwhile, the child is terminated, the remaining output is
    /// dropped, and the code of the terminated child is returned.
    pub async fn run_process(&mut self, invocation: &Invocation) -> anyhow::Result<i32> {
        if self.is_aborted() {
            bail!("aborted before launching '{}'", invocation.program().display());
        }

        self.log(format!("Running: {invocation}"));

        let (mut child, mut lines) = process::spawn_merged(invocation)?;
        self.launched_process = true;
        debug!(pid = child.id(), %invocation, "child process started");

        let abort = self.abort.clone();

        loop {
            tokio::select! {
                biased;

                _ = abort.aborted() => {
                    return self.terminate(&mut child).await;
                }

                line = lines.recv() => match line {
                    Some(line) => {
                        if let Some(event) = self.parser.classify(&line) {
                            self.forward(event);
                        }
                    }
                    None => break,
                },
            }
        }

        let status = tokio::select! {
            biased;

            _ = abort.aborted() => {
                return self.terminate(&mut child).await;
            }

            status = child.wait() => status.with_context(|| {
                format!("waiting for '{}'", invocation.program().display())
            })?,
        };

        let code = status.code().unwrap_or(-1);
        debug!(exit_code = code, %invocation, "child process exited");
        Ok(code)
    }

    async fn terminate(&mut self, child: &mut tokio::process::Child) -> anyhow::Result<i32> {
        info!(pid = child.id(), "terminating child process after abort");
        let code = match process::terminate(child, self.grace_period).await {
            Ok(status) => status.code().unwrap_or(-1),
            Err(err) => {
                warn!(error = %err, "failed to terminate child process");
                -1
            }
        };
        self.notice("Operation aborted by user");
        Ok(code)
    }
}
