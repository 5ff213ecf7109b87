// crates/test-utils/src/scripted.rs

//! In-process fakes: an operation that follows a script instead of spawning
//! anything, and a listener that records what it receives.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swbridge::errors::{Result, SwBridgeError};
use swbridge::exec::{EventListener, Invocation, RunContext};
use swbridge::ops::{Operation, OperationFuture};
use swbridge::protocol::LineEvent;
use swbridge::types::OperationKind;

/// One step of a [`ScriptedOperation`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Emit a line through the context, as if a tool printed it.
    Line(String),
    Sleep(Duration),
    /// Block until the run is aborted.
    WaitForAbort,
    /// Finish with this exit code.
    Exit(i32),
    /// Finish with an error carrying this message.
    Fail(String),
    /// Run a child process; a nonzero exit code ends the script with it.
    Process(Invocation),
}

/// An operation that plays back a fixed script.
///
/// Finishes with exit code 0 when the script runs out.
#[derive(Debug, Clone)]
pub struct ScriptedOperation {
    kind: OperationKind,
    steps: Vec<Step>,
    runs: Arc<AtomicUsize>,
}

impl ScriptedOperation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            steps: Vec::new(),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn line(mut self, line: &str) -> Self {
        self.steps.push(Step::Line(line.to_string()));
        self
    }

    pub fn sleep(mut self, ms: u64) -> Self {
        self.steps.push(Step::Sleep(Duration::from_millis(ms)));
        self
    }

    pub fn wait_for_abort(mut self) -> Self {
        self.steps.push(Step::WaitForAbort);
        self
    }

    pub fn exit(mut self, code: i32) -> Self {
        self.steps.push(Step::Exit(code));
        self
    }

    pub fn fail(mut self, message: &str) -> Self {
        self.steps.push(Step::Fail(message.to_string()));
        self
    }

    pub fn process(mut self, invocation: Invocation) -> Self {
        self.steps.push(Step::Process(invocation));
        self
    }

    /// `sh -c <script>` as a process step.
    pub fn shell(self, script: &str) -> Self {
        self.process(Invocation::new("sh").arg("-c").arg(script))
    }

    /// How many times `run` was entered.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Operation for ScriptedOperation {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            self.runs.fetch_add(1, Ordering::SeqCst);
            for step in &self.steps {
                match step {
                    Step::Line(line) => ctx.log(line),
                    Step::Sleep(d) => tokio::time::sleep(*d).await,
                    Step::WaitForAbort => {
                        while !ctx.is_aborted() {
                            tokio::time::sleep(Duration::from_millis(5)).await;
                        }
                        return Ok(-1);
                    }
                    Step::Exit(code) => return Ok(*code),
                    Step::Fail(msg) => {
                        return Err(SwBridgeError::InvalidInput(msg.clone()));
                    }
                    Step::Process(invocation) => {
                        let code = ctx.run_process(invocation).await?;
                        if code != 0 {
                            return Ok(code);
                        }
                    }
                }
            }
            Ok(0)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(self
            .steps
            .iter()
            .filter_map(|s| match s {
                Step::Process(inv) => Some(inv.clone()),
                _ => None,
            })
            .collect())
    }
}

/// Listener that stores every event, shareable with the test body.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<LineEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Only the log lines, in order.
    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LineEvent::Log(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl EventListener for RecordingListener {
    fn on_event(&mut self, event: LineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
