//! Progress snapshots and rate limiting.
//!
//! Engines report progress through [`ProgressEvent`]s. The brute-force
//! engine sends at most one event per [`ProgressThrottle`] interval
//! (100 ms by default) plus one final event that is never dropped.

use std::time::{Duration, Instant};

/// Default minimum spacing between progress events (10 Hz).
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot of a running search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressEvent {
    /// Generation index (GA) or candidates processed (brute force).
    pub step: u64,
    /// Total generations or total candidates.
    pub total: u64,
    /// Best score so far, if any candidate has been scored.
    pub best_score: Option<f64>,
    pub valid_count: u64,
    pub invalid_count: u64,
    pub elapsed: Duration,
    /// Linear extrapolation from the average time per step.
    pub estimated_remaining: Option<Duration>,
    /// `true` only for the final event of a run.
    pub finished: bool,
}

impl ProgressEvent {
    /// Builds an event, filling in the time estimate.
    pub fn new(
        step: u64,
        total: u64,
        best_score: Option<f64>,
        valid_count: u64,
        invalid_count: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            step,
            total,
            best_score,
            valid_count,
            invalid_count,
            elapsed,
            estimated_remaining: estimate_remaining(step, total, elapsed),
            finished: false,
        }
    }

    /// Marks the event as the run's last.
    pub fn into_final(mut self) -> Self {
        self.finished = true;
        self.estimated_remaining = Some(Duration::ZERO);
        self
    }

    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.step as f64 / self.total as f64).min(1.0)
        }
    }
}

fn estimate_remaining(step: u64, total: u64, elapsed: Duration) -> Option<Duration> {
    if step == 0 {
        return None;
    }
    let left = total.saturating_sub(step);
    Some(elapsed.mul_f64(left as f64 / step as f64))
}

/// Lets an event through at most once per interval.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` (and records `now`) if an event may be sent.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
