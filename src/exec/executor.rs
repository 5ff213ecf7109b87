// src/exec/executor.rs

//! Background executor: one run at a time, off the caller's task.
//!
//! `run` returns immediately. Everything the run produces is sent over an
//! unbounded channel in production order, followed by exactly one
//! [`ExecutorEvent::Finished`].

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::{Result, SwBridgeError};
use crate::exec::abort::AbortHandle;
use crate::exec::runner::{EventListener, ProcessRunner, RunResult, RunnerOptions};
use crate::ops::Operation;
use crate::protocol::LineEvent;

/// What the observer of a [`BackgroundExecutor`] receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorEvent {
    Progress { current: u64, total: u64 },
    StateChanged(String),
    Log(String),
    /// Terminal notification; sent once per run, always last.
    Finished(RunResult),
}

impl From<LineEvent> for ExecutorEvent {
    fn from(event: LineEvent) -> Self {
        match event {
            LineEvent::Progress { current, total } => ExecutorEvent::Progress { current, total },
            LineEvent::State(phrase) => ExecutorEvent::StateChanged(phrase),
            LineEvent::Log(text) => ExecutorEvent::Log(text),
        }
    }
}

/// Forwards runner events into the executor channel without blocking.
struct ChannelListener {
    tx: mpsc::UnboundedSender<ExecutorEvent>,
}

impl EventListener for ChannelListener {
    fn on_event(&mut self, event: LineEvent) {
        // A dropped receiver only means nobody is watching any more.
        let _ = self.tx.send(event.into());
    }
}

/// Runs operations on a background tokio task.
///
/// Cloning yields another handle to the same executor; clones share the
/// event channel and the "one active run" slot.
#[derive(Debug, Clone)]
pub struct BackgroundExecutor {
    options: RunnerOptions,
    events: mpsc::UnboundedSender<ExecutorEvent>,
    active: Arc<Mutex<Option<AbortHandle>>>,
}

impl BackgroundExecutor {
    /// Create an executor and the receiver its events are delivered to.
    pub fn new(options: RunnerOptions) -> (Self, mpsc::UnboundedReceiver<ExecutorEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let executor = Self {
            options,
            events,
            active: Arc::new(Mutex::new(None)),
        };
        (executor, rx)
    }

    /// Start `operation` in the background.
    ///
    /// Fails with [`SwBridgeError::AlreadyRunning`] while another run is
    /// active. The returned handle resolves to the same result that is sent
    /// as [`ExecutorEvent::Finished`].
    pub fn run(&self, operation: Arc<dyn Operation>) -> Result<JoinHandle<RunResult>> {
        let runner = ProcessRunner::new(self.options.clone());
        {
            let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                debug!(op = %operation.kind(), "run rejected; executor busy");
                return Err(SwBridgeError::AlreadyRunning);
            }
            *slot = Some(runner.abort_handle());
        }

        let events = self.events.clone();
        let active = Arc::clone(&self.active);
        let kind = operation.kind();
        info!(op = %kind, "background run scheduled");

        let handle = tokio::spawn(async move {
            let listener = ChannelListener {
                tx: events.clone(),
            };
            let result = runner.start(operation.as_ref(), listener).await;

            // Free the slot first so the observer can start the next run as
            // soon as it sees `Finished`.
            *active.lock().unwrap_or_else(PoisonError::into_inner) = None;
            debug!(op = %kind, succeeded = result.succeeded, "background run finished");
            let _ = events.send(ExecutorEvent::Finished(result.clone()));
            result
        });

        Ok(handle)
    }

    /// Abort the active run, if any.
    pub fn abort(&self) {
        let slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(handle) => {
                if handle.abort() {
                    info!("abort forwarded to active run");
                }
            }
            None => debug!("abort ignored; executor idle"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
