// src/protocol/parser.rs

//! Classifier for the line protocol spoken by the external executable.

use tracing::trace;

use super::LineEvent;
use super::phase::Phase;
use crate::types::OperationKind;

const TOTAL_PREFIX: &str = "TOTAL:";
const PROGRESS_PREFIX: &str = "PROGRESS:";
const STATE_PREFIX: &str = "STATE:";

/// Turns output lines into [`LineEvent`]s and tracks the progress counters.
///
/// The only mutable state is `current` and `total`, both starting at zero.
/// A `total` of zero means the total is not known yet.
#[derive(Debug, Clone)]
pub struct LineParser {
    kind: OperationKind,
    current: u64,
    total: u64,
    counts_locked: bool,
}

impl LineParser {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            current: 0,
            total: 0,
            counts_locked: false,
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Classify a single line.
    ///
    /// Returns `None` for blank lines, for `TOTAL:`/`PROGRESS:` lines whose
    /// payload is not a non-negative integer, and for any count line once
    /// the counters are locked.
    pub fn classify(&mut self, line: &str) -> Option<LineEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if self.counts_locked
            && (line.starts_with(TOTAL_PREFIX) || line.starts_with(PROGRESS_PREFIX))
        {
            trace!(line, "counters driven by caller; ignoring count line");
            return None;
        }

        if let Some(payload) = line.strip_prefix(TOTAL_PREFIX) {
            return match parse_count(payload) {
                Some(total) => Some(self.set_total(total)),
                None => {
                    trace!(line, "ignoring malformed TOTAL line");
                    None
                }
            };
        }

        if let Some(payload) = line.strip_prefix(PROGRESS_PREFIX) {
            return match parse_count(payload) {
                Some(current) => Some(self.set_current(current)),
                None => {
                    trace!(line, "ignoring malformed PROGRESS line");
                    None
                }
            };
        }

        if let Some(token) = line.strip_prefix(STATE_PREFIX) {
            // strip_prefix consumes exactly the first colon; any further
            // colons belong to the token.
            let phase = Phase::from_token(token);
            return Some(LineEvent::State(phase.describe(self.kind)));
        }

        Some(LineEvent::Log(line.to_string()))
    }

    /// Stop `TOTAL:`/`PROGRESS:` lines from moving the counters; only
    /// [`set_total`](Self::set_total), [`set_current`](Self::set_current)
    /// and [`advance`](Self::advance) change them afterwards.
    pub fn lock_counts(&mut self) {
        self.counts_locked = true;
    }

    /// Replace the total and report the resulting progress pair.
    pub fn set_total(&mut self, total: u64) -> LineEvent {
        self.total = total;
        self.progress()
    }

    /// Replace the current count and report the resulting progress pair.
    pub fn set_current(&mut self, current: u64) -> LineEvent {
        self.current = current;
        self.progress()
    }

    /// Advance the current count by one.
    pub fn advance(&mut self) -> LineEvent {
        self.current = self.current.saturating_add(1);
        self.progress()
    }

    fn progress(&self) -> LineEvent {
        LineEvent::Progress {
            current: self.current,
            total: self.total,
        }
    }
}

fn parse_count(payload: &str) -> Option<u64> {
    payload.trim().parse::<u64>().ok()
}
