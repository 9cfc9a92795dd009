use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StopwatchStatus {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl Default for StopwatchStatus {
    fn default() -> Self {
        StopwatchStatus::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchSnapshot {
    pub status: StopwatchStatus,
    pub elapsed_ms: u64,
    pub elapsed_secs: u64,
}

/// Elapsed-time counter that can be paused without drifting.
///
/// Every transition takes the current instant explicitly so callers (and tests)
/// control the clock.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    status: StopwatchStatus,
    /// Time accumulated from earlier running windows; combines with `running_anchor`
    /// to compute the true elapsed duration.
    elapsed_baseline: Duration,
    running_anchor: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StopwatchStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == StopwatchStatus::Running
    }

    pub fn has_started(&self) -> bool {
        self.status != StopwatchStatus::Idle
    }

    /// Starts counting from zero. Returns false unless the stopwatch was idle.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.status != StopwatchStatus::Idle {
            return false;
        }
        self.status = StopwatchStatus::Running;
        self.elapsed_baseline = Duration::ZERO;
        self.running_anchor = Some(now);
        true
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        if self.status != StopwatchStatus::Running {
            return false;
        }
        self.fold_anchor(now);
        self.status = StopwatchStatus::Paused;
        true
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        if self.status != StopwatchStatus::Paused {
            return false;
        }
        self.status = StopwatchStatus::Running;
        self.running_anchor = Some(now);
        true
    }

    /// Freezes the counter for good. Valid from running or paused.
    pub fn stop(&mut self, now: Instant) -> bool {
        match self.status {
            StopwatchStatus::Running => {
                self.fold_anchor(now);
                self.status = StopwatchStatus::Stopped;
                true
            }
            StopwatchStatus::Paused => {
                self.status = StopwatchStatus::Stopped;
                true
            }
            StopwatchStatus::Idle | StopwatchStatus::Stopped => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match (self.status, self.running_anchor) {
            (StopwatchStatus::Running, Some(anchor)) => self
                .elapsed_baseline
                .saturating_add(now.saturating_duration_since(anchor)),
            _ => self.elapsed_baseline,
        }
    }

    /// Whole seconds elapsed; the counter reports at 1-second granularity.
    pub fn elapsed_secs_at(&self, now: Instant) -> u64 {
        self.elapsed_at(now).as_secs()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> StopwatchSnapshot {
        let elapsed = self.elapsed_at(now);
        StopwatchSnapshot {
            status: self.status,
            elapsed_ms: elapsed.as_millis() as u64,
            elapsed_secs: elapsed.as_secs(),
        }
    }

    fn fold_anchor(&mut self, now: Instant) {
        if let Some(anchor) = self.running_anchor.take() {
            self.elapsed_baseline = self
                .elapsed_baseline
                .saturating_add(now.saturating_duration_since(anchor));
        }
    }
}
