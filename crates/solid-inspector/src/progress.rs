//! Status reporting for inspection phases.
//!
//! Hosts show a one-line status while an inspection runs. The inspector
//! reports each phase through a [`StatusSink`] and clears the status with an
//! empty message when it is done.
//!
//! # Example
//!
//! ```
//! use solid_inspector::progress::{StatusLog, StatusSink};
//!
//! let log = StatusLog::default();
//! log.set_status("Inspecting edges...");
//! assert_eq!(log.messages(), vec!["Inspecting edges...".to_string()]);
//! ```

use std::cell::RefCell;
use std::time::{Duration, Instant};

use tracing::debug;

/// Receives human-readable status text.
pub trait StatusSink {
    /// Replace the current status. An empty message clears it.
    fn set_status(&self, message: &str);
}

/// Discards status text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatus;

impl StatusSink for NoStatus {
    #[inline]
    fn set_status(&self, _message: &str) {}
}

/// Emits status text as `debug` events under `solid_inspector::progress`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn set_status(&self, message: &str) {
        if !message.is_empty() {
            debug!(target: "solid_inspector::progress", status = message);
        }
    }
}

/// Records every status message, in order.
#[derive(Debug, Default)]
pub struct StatusLog {
    messages: RefCell<Vec<String>>,
}

impl StatusLog {
    /// Messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl StatusSink for StatusLog {
    fn set_status(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl<F: Fn(&str)> StatusSink for F {
    fn set_status(&self, message: &str) {
        self(message)
    }
}

/// Snapshot of a multi-phase operation.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Phases started so far.
    pub current: u64,
    /// Total number of phases.
    pub total: u64,
    /// Status text of the current phase.
    pub message: String,
    /// Time since the operation started.
    pub elapsed: Duration,
}

impl Progress {
    /// Fraction of phases started, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }

    /// Percentage of phases started.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// Walks a fixed list of phases, forwarding each to a sink.
pub(crate) struct PhaseReporter<'s> {
    sink: &'s dyn StatusSink,
    total: u64,
    current: u64,
    start: Instant,
}

impl<'s> PhaseReporter<'s> {
    pub(crate) fn new(sink: &'s dyn StatusSink, total: u64) -> Self {
        Self {
            sink,
            total,
            current: 0,
            start: Instant::now(),
        }
    }

    /// Start the next phase.
    pub(crate) fn phase(&mut self, message: &str) -> Progress {
        self.current += 1;
        self.sink.set_status(message);
        Progress {
            current: self.current,
            total: self.total,
            message: message.to_string(),
            elapsed: self.start.elapsed(),
        }
    }

    /// Clear the status.
    pub(crate) fn finish(self) {
        self.sink.set_status("");
    }
}
