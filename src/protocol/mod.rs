// src/protocol/mod.rs

//! Line protocol emitted by the external CAD tooling.
//!
//! Each line on the tool's merged stdout/stderr stream is one of:
//! - `TOTAL:<n>`: number of work items, updates the progress total
//! - `PROGRESS:<n>`: absolute number of finished items
//! - `STATE:<token>`: the tool entered a new phase (see [`phase`])
//! - anything else: a log line for the user
//!
//! Blank lines are dropped. [`parser::LineParser`] does the classification.

pub mod parser;
pub mod phase;

pub use parser::LineParser;
pub use phase::Phase;

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Progress changed (or was re-announced).
    Progress { current: u64, total: u64 },
    /// The tool entered a new phase; carries the display phrase.
    State(String),
    /// Plain text for the log pane.
    Log(String),
}
