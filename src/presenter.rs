// src/presenter.rs

//! Terminal presenter for executor events.
//!
//! Output format, one event per line:
//! - log text verbatim
//! - phase changes as `==> <phrase>`
//! - progress as `[current/total]`, or `[current/?]` while the total is
//!   unknown
//! - the final message, prefixed with `Error: ` when the run failed

use std::io::Write;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::exec::{ExecutorEvent, RunResult};

/// Render one event as a single output line.
pub fn render(event: &ExecutorEvent) -> String {
    match event {
        ExecutorEvent::Progress { current, total: 0 } => format!("[{current}/?]"),
        ExecutorEvent::Progress { current, total } => format!("[{current}/{total}]"),
        ExecutorEvent::StateChanged(phrase) => format!("==> {phrase}"),
        ExecutorEvent::Log(text) => text.clone(),
        ExecutorEvent::Finished(result) if result.succeeded => result.message.clone(),
        ExecutorEvent::Finished(result) => format!("Error: {}", result.message),
    }
}

/// Print events until the run finishes.
///
/// Returns the terminal result, or `None` if the channel closed without one.
pub async fn present<W: Write>(
    mut events: mpsc::UnboundedReceiver<ExecutorEvent>,
    mut out: W,
) -> Result<Option<RunResult>> {
    while let Some(event) = events.recv().await {
        writeln!(out, "{}", render(&event))?;
        out.flush()?;
        if let ExecutorEvent::Finished(result) = event {
            return Ok(Some(result));
        }
    }
    Ok(None)
}
