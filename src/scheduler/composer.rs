//! Multi-shift horizon composition.
//!
//! Covers a horizon of several shifts with one of two strategies:
//!
//! - **Independent**: one cutoff build per shift, each from an empty line,
//!   seeded `base_seed + shift_index`. Records are shifted by
//!   `shift_index * shift_minutes` in time and by the running job count in
//!   id, then concatenated.
//! - **Continuous**: one continuous-feed build over the whole horizon;
//!   completions are bucketed by last-stage exit into
//!   `[0, L]`, `(L, 2L]`, ..., `((n-1)L, nL]`. A job exiting exactly on a
//!   boundary counts toward the earlier shift.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{project, FeedPolicy, LineScheduler, DEFAULT_MAX_JOBS};
use crate::models::{DurationMode, Schedule, ShiftSummary, Stage, TimelineEvent};

/// Shift length used when the requested one is not a positive number (minutes).
pub const DEFAULT_SHIFT_MINUTES: f64 = 720.0;

/// Upper bound on the number of shifts in one horizon.
pub const MAX_SHIFTS: u32 = 1_000;

/// How shifts of the horizon relate to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Composition {
    /// Every shift starts and ends with an empty line.
    #[default]
    Independent,
    /// Work in progress carries over shift boundaries.
    Continuous,
}

impl Composition {
    /// Shift count used when none (or a non-positive one) is configured.
    pub fn default_shift_count(self) -> u32 {
        match self {
            Composition::Independent => 1,
            Composition::Continuous => 2,
        }
    }
}

/// Combined result over the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonOutcome {
    /// All records of the horizon, in horizon time.
    pub schedule: Schedule,
    /// One summary per shift.
    pub shifts: Vec<ShiftSummary>,
    /// Shift length used (minutes).
    pub shift_minutes: f64,
    /// Whether any underlying build hit the job cap.
    pub truncated: bool,
}

impl HorizonOutcome {
    /// Completions summed over all shifts.
    pub fn total_completed(&self) -> usize {
        self.shifts.iter().map(|s| s.completed).sum()
    }

    /// Completions in the first shift (0 for an empty horizon).
    pub fn first_shift_completed(&self) -> usize {
        self.shifts.first().map(|s| s.completed).unwrap_or(0)
    }

    /// Horizon length in minutes.
    pub fn horizon_minutes(&self) -> f64 {
        self.shift_minutes * self.shifts.len() as f64
    }

    /// Chronological stage-completion events of the horizon.
    pub fn events(&self) -> Vec<TimelineEvent> {
        project(&self.schedule)
    }
}

/// Builds the schedule of a multi-shift horizon.
///
/// # Example
///
/// ```
/// use u_flowline::models::{DurationMode, Stage};
/// use u_flowline::scheduler::{Composition, ShiftComposer};
///
/// let stages = vec![Stage::fixed("Press", 10.0)];
/// let outcome = ShiftComposer::new(30.0)
///     .with_shift_count(Some(2))
///     .with_composition(Composition::Independent)
///     .compose(&stages);
///
/// assert_eq!(outcome.shifts.len(), 2);
/// assert_eq!(outcome.total_completed(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftComposer {
    shift_minutes: f64,
    shift_count: Option<u32>,
    composition: Composition,
    mode: DurationMode,
    seed: Option<u64>,
    max_jobs: usize,
}

impl ShiftComposer {
    /// Creates a composer for shifts of `shift_minutes`.
    ///
    /// A non-finite or non-positive length is replaced by
    /// [`DEFAULT_SHIFT_MINUTES`].
    pub fn new(shift_minutes: f64) -> Self {
        let shift_minutes = if shift_minutes.is_finite() && shift_minutes > 0.0 {
            shift_minutes
        } else {
            DEFAULT_SHIFT_MINUTES
        };
        Self {
            shift_minutes,
            shift_count: None,
            composition: Composition::Independent,
            mode: DurationMode::Min,
            seed: None,
            max_jobs: DEFAULT_MAX_JOBS,
        }
    }

    /// Sets the number of shifts; `None` or `Some(0)` uses the
    /// composition's default. Counts above [`MAX_SHIFTS`] are capped.
    pub fn with_shift_count(mut self, shift_count: Option<u32>) -> Self {
        self.shift_count = shift_count;
        self
    }

    /// Sets the composition strategy.
    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.composition = composition;
        self
    }

    /// Sets the duration policy.
    pub fn with_mode(mut self, mode: DurationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets or clears the base seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the job cap applied to every underlying build.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    /// Number of shifts actually composed, in `1..=MAX_SHIFTS`.
    pub fn effective_shift_count(&self) -> u32 {
        self.shift_count
            .filter(|&n| n > 0)
            .unwrap_or_else(|| self.composition.default_shift_count())
            .min(MAX_SHIFTS)
    }

    /// Shift length in minutes.
    pub fn shift_minutes(&self) -> f64 {
        self.shift_minutes
    }

    /// Horizon length in minutes.
    pub fn horizon_minutes(&self) -> f64 {
        self.shift_minutes * self.effective_shift_count() as f64
    }

    /// Composes the horizon for `stages`.
    pub fn compose(&self, stages: &[Stage]) -> HorizonOutcome {
        let shifts = self.effective_shift_count() as usize;
        debug!(
            shifts,
            shift_minutes = self.shift_minutes,
            composition = ?self.composition,
            "composing horizon"
        );

        let outcome = match self.composition {
            Composition::Independent => self.compose_independent(stages, shifts),
            Composition::Continuous => self.compose_continuous(stages, shifts),
        };

        debug!(
            jobs = outcome.schedule.job_count(),
            completed = outcome.total_completed(),
            "horizon composed"
        );
        outcome
    }

    fn scheduler(&self) -> LineScheduler {
        LineScheduler::new()
            .with_mode(self.mode)
            .with_max_jobs(self.max_jobs)
    }

    fn compose_independent(&self, stages: &[Stage], shifts: usize) -> HorizonOutcome {
        let mut schedule = Schedule::new(stages.len());
        let mut summaries = Vec::new();
        let mut job_offset = 0;
        let mut truncated = false;

        for shift in 0..shifts {
            let seed = self.seed.map(|s| s.wrapping_add(shift as u64));
            let out = self
                .scheduler()
                .with_feed_policy(FeedPolicy::Cutoff)
                .with_horizon(self.shift_minutes)
                .with_seed(seed)
                .build(stages, self.shift_minutes);

            summaries.push(ShiftSummary::new(shift, out.completed));
            truncated |= out.truncated;

            let jobs_this_shift = out.schedule.max_job_id().map(|id| id + 1).unwrap_or(0);
            let time_offset = shift as f64 * self.shift_minutes;
            schedule.append(out.schedule.offset(time_offset, job_offset));
            job_offset += jobs_this_shift;
        }

        HorizonOutcome {
            schedule,
            shifts: summaries,
            shift_minutes: self.shift_minutes,
            truncated,
        }
    }

    fn compose_continuous(&self, stages: &[Stage], shifts: usize) -> HorizonOutcome {
        let out = self
            .scheduler()
            .with_feed_policy(FeedPolicy::Continuous)
            .with_horizon(self.horizon_minutes())
            .with_seed(self.seed)
            .build(stages, self.shift_minutes);

        let exits: Vec<f64> = out.schedule.job_exits().iter().map(|&(_, t)| t).collect();
        let counts = bucket_exits(&exits, self.shift_minutes, shifts);
        let summaries = counts
            .into_iter()
            .enumerate()
            .map(|(i, n)| ShiftSummary::new(i, n))
            .collect();

        HorizonOutcome {
            schedule: out.schedule,
            shifts: summaries,
            shift_minutes: self.shift_minutes,
            truncated: out.truncated,
        }
    }
}

/// Counts exit times per shift window.
///
/// Window 0 is `[0, L]`; window `i > 0` is `(iL, (i+1)L]`. Exits outside
/// `[0, shifts * L]` are not counted. Boundaries are compared as
/// `(i + 1) * L`, so an exit computed that way lands in the earlier window.
pub fn bucket_exits(exits: &[f64], shift_minutes: f64, shifts: usize) -> Vec<usize> {
    let mut counts = vec![0; shifts];
    if shifts == 0 || shift_minutes.is_nan() || shift_minutes <= 0.0 {
        return counts;
    }
    let upper = |i: usize| (i + 1) as f64 * shift_minutes;
    for &t in exits {
        if t.is_nan() || t < 0.0 || t > upper(shifts - 1) {
            continue;
        }
        // Division gives a guess that can be one window off either way.
        let mut idx = ((t / shift_minutes).ceil() as usize)
            .saturating_sub(1)
            .min(shifts - 1);
        while idx > 0 && t <= upper(idx - 1) {
            idx -= 1;
        }
        while t > upper(idx) {
            idx += 1;
        }
        counts[idx] += 1;
    }
    counts
}
