//! Completion estimate for running jobs.
//!
//! Progress is derived from a run's start time and its estimated completion
//! time (`etc`), recomputed on every tick of a periodic timer. The timer only
//! runs while the watched list of running jobs is non-empty.

use std::time::Duration;

use crate::effect::Effect;
use crate::types::{RunKey, RunRecord};

/// Period of the progress ticker.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Fraction of the estimate past which a run is reported as overtime.
pub const OVERTIME_THRESHOLD: f64 = 1.2;

/// Displayed percentage for runs past their estimate but not yet overtime.
pub const CLAMPED_PERCENT: f64 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Estimated completion in percent, `0.0..=99.0`.
    Percent(f64),
    /// The run took considerably longer than its estimate.
    Overtime,
}

/// Estimates progress of a run started at `started` and expected to finish at
/// `etc`, as seen at `now`. All values are unix seconds.
pub fn estimate(started: i64, etc: i64, now: f64) -> Progress {
    let started = started as f64;
    let span = etc as f64 - started;
    if span <= 0.0 {
        return if now > started {
            Progress::Overtime
        } else {
            Progress::Percent(0.0)
        };
    }
    let fraction = (now - started) / span;
    if fraction > OVERTIME_THRESHOLD {
        Progress::Overtime
    } else if fraction >= 1.0 {
        Progress::Percent(CLAMPED_PERCENT)
    } else {
        Progress::Percent((100.0 * fraction).max(0.0))
    }
}

/// Updates every run that carries an estimate. Returns whether anything was
/// updated.
pub fn apply_progress(runs: &mut [RunRecord], now: f64) -> bool {
    let mut touched = false;
    for run in runs.iter_mut() {
        if let (Some(started), Some(etc)) = (run.started, run.etc) {
            run.progress = Some(estimate(started, etc, now));
            touched = true;
        }
    }
    touched
}

/// Tracks whether the periodic ticker is armed and for which running list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTimer {
    period: Duration,
    armed: bool,
    watched: Vec<RunKey>,
}

impl Default for ProgressTimer {
    fn default() -> Self {
        Self::with_period(TICK_PERIOD)
    }
}

impl ProgressTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            armed: false,
            watched: Vec::new(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Compares `running` against the list seen last time. On change the
    /// previous ticker is replaced by a fresh one, or cancelled when nothing
    /// is running anymore.
    pub fn reconcile(&mut self, running: &[RunRecord]) -> Option<Effect> {
        let keys: Vec<RunKey> = running.iter().map(RunRecord::key).collect();
        if keys == self.watched {
            return None;
        }
        self.watched = keys;
        if !self.watched.is_empty() {
            self.armed = true;
            Some(Effect::StartTicker {
                period: self.period,
            })
        } else {
            self.disarm()
        }
    }

    /// Cancels the ticker, e.g. when the owning view goes away.
    pub fn disarm(&mut self) -> Option<Effect> {
        self.watched.clear();
        if std::mem::take(&mut self.armed) {
            Some(Effect::CancelTicker)
        } else {
            None
        }
    }
}
