//! Throttled progress reporting for chunk completion.
//!
//! Progress advances only when a task completes. An event is emitted when
//! the rounded percentage moved by at least the configured threshold since
//! the last emission, or when the minimum interval has elapsed, whichever
//! comes first. The 100% event is never suppressed.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Throttling parameters for progress events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Minimum change in percentage points between emissions
    pub percent_threshold: u32,

    /// Minimum time between emissions when the percentage barely moves
    pub min_interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            percent_threshold: 10,
            min_interval: Duration::from_secs(2),
        }
    }
}

/// A progress snapshot delivered to a [`ProgressSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Tasks finished so far (success or failure)
    pub completed: usize,
    /// Tasks submitted in this run
    pub total: usize,
    /// `completed / total` rounded to an integer percentage
    pub percent: u32,
    /// Wall-clock time of emission
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    /// Check if this event reports every task done.
    ///
    /// Callers must not read this as "the conversion returned"; aggregation
    /// still runs after the last task completes.
    pub fn is_final(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    /// Called for every emitted event, in emission order.
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Sink that logs events at info level.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    /// Create a logging sink whose lines are suffixed with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressSink for LogProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.label.is_empty() {
            log::info!(
                "Progress: {}% ({}/{})",
                event.percent,
                event.completed,
                event.total
            );
        } else {
            log::info!(
                "Progress: {}% ({}/{}) | file={}",
                event.percent,
                event.completed,
                event.total,
                self.label
            );
        }
    }
}

/// Counters for one run, used only to decide when to emit.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: ProgressConfig,
    total: usize,
    completed: usize,
    last_percent: u32,
    last_emitted_at: Instant,
}

impl ProgressTracker {
    /// Start tracking a run of `total` tasks.
    pub fn new(total: usize, config: ProgressConfig, started_at: Instant) -> Self {
        Self {
            config,
            total,
            completed: 0,
            last_percent: 0,
            last_emitted_at: started_at,
        }
    }

    /// Tasks completed so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Tasks in this run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current rounded percentage.
    pub fn percent(&self) -> u32 {
        rounded_percent(self.completed, self.total)
    }

    /// Record one completed task and return an event if one is due.
    pub fn record_completion(&mut self, now: Instant) -> Option<ProgressEvent> {
        self.completed = (self.completed + 1).min(self.total);
        let percent = self.percent();

        let is_final = self.completed >= self.total;
        let moved_enough = percent.saturating_sub(self.last_percent) >= self.config.percent_threshold;
        let waited_enough = now.saturating_duration_since(self.last_emitted_at) >= self.config.min_interval;

        if !(is_final || moved_enough || waited_enough) {
            return None;
        }

        self.last_percent = percent;
        self.last_emitted_at = now;
        Some(ProgressEvent {
            completed: self.completed,
            total: self.total,
            percent,
            timestamp: Utc::now(),
        })
    }
}

/// `completed / total` as a percentage rounded half up; an empty run is 100%.
pub fn rounded_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((completed * 100 + total / 2) / total) as u32
}
