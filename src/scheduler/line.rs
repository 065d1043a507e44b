//! Flow-line schedule builder.
//!
//! # Algorithm
//!
//! 1. Jobs are generated one at a time, in id order, all ready at t = 0.
//! 2. Each job visits every stage in topology order.
//! 3. At each stage the job takes the server that frees up first
//!    (lowest index on ties) and starts at `max(arrival, free_at)`.
//! 4. The job's exit counts as completed if it falls within the shift.
//! 5. The feed policy decides after each job whether to admit another.
//!
//! Assignments are greedy and never revisited.
//!
//! # Complexity
//! O(n * m * c) where n=jobs, m=stages, c=servers per stage.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 6: Flow Shops and Flexible Flow Shops

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::ServerPool;
use crate::models::{DurationMode, JobStageRecord, Schedule, Stage};

/// Default safety cap on the number of generated jobs.
pub const DEFAULT_MAX_JOBS: usize = 200_000;

/// When the builder stops admitting jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedPolicy {
    /// Stop once a job leaves the last stage after the shift ends.
    ///
    /// The overflowing job stays in the schedule. Models a shift that
    /// starts and ends with an empty line.
    #[default]
    Cutoff,
    /// Keep feeding until a job enters the first stage after the horizon.
    ///
    /// Jobs finishing after the shift stay in the schedule but are not
    /// counted for it.
    Continuous,
}

impl FeedPolicy {
    /// Whether generation stops after a job with the given first-stage
    /// entry and last-stage exit.
    pub fn should_stop(self, entry: f64, exit: f64, shift_minutes: f64, horizon: f64) -> bool {
        match self {
            FeedPolicy::Cutoff => exit > shift_minutes,
            FeedPolicy::Continuous => entry > horizon,
        }
    }
}

/// Result of one build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    /// Every scheduled (job, stage) pair.
    pub schedule: Schedule,
    /// Jobs whose exit from the last stage is within the shift.
    pub completed: usize,
    /// Whether the job cap ended generation before the feed policy did.
    pub truncated: bool,
}

impl BuildOutcome {
    fn empty(stage_count: usize) -> Self {
        Self {
            schedule: Schedule::new(stage_count),
            completed: 0,
            truncated: false,
        }
    }
}

/// Greedy earliest-free-server builder for a linear line of stages.
///
/// # Example
///
/// ```
/// use u_flowline::models::{DurationMode, Stage};
/// use u_flowline::scheduler::{FeedPolicy, LineScheduler};
///
/// let stages = vec![Stage::fixed("Press", 10.0)];
/// let outcome = LineScheduler::new()
///     .with_mode(DurationMode::Min)
///     .with_feed_policy(FeedPolicy::Cutoff)
///     .build(&stages, 30.0);
///
/// assert_eq!(outcome.completed, 3);
/// assert_eq!(outcome.schedule.job_count(), 4); // the overflowing job is kept
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LineScheduler {
    mode: DurationMode,
    feed_policy: FeedPolicy,
    max_jobs: usize,
    horizon: Option<f64>,
    seed: Option<u64>,
}

impl LineScheduler {
    /// Creates a builder: `Min` durations, cutoff feed, default job cap,
    /// horizon of two shifts, non-deterministic seed.
    pub fn new() -> Self {
        Self {
            mode: DurationMode::Min,
            feed_policy: FeedPolicy::Cutoff,
            max_jobs: DEFAULT_MAX_JOBS,
            horizon: None,
            seed: None,
        }
    }

    /// Sets the duration policy.
    pub fn with_mode(mut self, mode: DurationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the feed policy.
    pub fn with_feed_policy(mut self, feed_policy: FeedPolicy) -> Self {
        self.feed_policy = feed_policy;
        self
    }

    /// Sets the job cap.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    /// Sets an explicit feed horizon (minutes).
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets or clears the random seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Duration policy.
    pub fn mode(&self) -> DurationMode {
        self.mode
    }

    /// Feed policy.
    pub fn feed_policy(&self) -> FeedPolicy {
        self.feed_policy
    }

    /// Job cap.
    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// Random seed, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Feed horizon for a shift length: explicit value or two shifts.
    pub fn horizon_for(&self, shift_minutes: f64) -> f64 {
        self.horizon.unwrap_or(shift_minutes * 2.0)
    }

    /// Builds the schedule of `stages` for one reporting window of
    /// `shift_minutes`.
    ///
    /// Total over its input: an empty topology gives an empty outcome and
    /// the job cap silently truncates runaway generation.
    pub fn build(&self, stages: &[Stage], shift_minutes: f64) -> BuildOutcome {
        if stages.is_empty() {
            return BuildOutcome::empty(0);
        }

        let horizon = self.horizon_for(shift_minutes);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut pools: Vec<ServerPool> = stages
            .iter()
            .map(|s| ServerPool::new(s.server_count()))
            .collect();
        let mut schedule = Schedule::new(stages.len());
        let mut completed = 0;
        let mut stopped = false;

        debug!(
            stages = stages.len(),
            shift_minutes,
            horizon,
            mode = %self.mode,
            feed = ?self.feed_policy,
            "building line schedule"
        );

        for job in 0..self.max_jobs {
            let mut arrival = 0.0;
            let mut entry = 0.0;

            for (stage_idx, (stage, pool)) in stages.iter().zip(pools.iter_mut()).enumerate() {
                let duration = self.mode.draw(stage, &mut rng);
                let (server, free_at) = pool.earliest();

                let start = f64::max(arrival, free_at);
                let finish = start + duration;
                if stage_idx == 0 {
                    entry = start;
                }

                pool.occupy(server, finish);
                schedule.add_record(JobStageRecord::new(job, stage_idx, server, start, finish));
                arrival = finish;
            }

            let exit = arrival;
            if exit <= shift_minutes {
                completed += 1;
            }
            trace!(job, entry, exit, "job routed");

            if self
                .feed_policy
                .should_stop(entry, exit, shift_minutes, horizon)
            {
                stopped = true;
                break;
            }
        }

        let truncated = !stopped && self.max_jobs > 0;
        if truncated {
            warn!(
                max_jobs = self.max_jobs,
                "job cap reached before the feed policy stopped; schedule truncated"
            );
        }

        debug!(
            jobs = schedule.job_count(),
            completed, truncated, "line schedule built"
        );

        BuildOutcome {
            schedule,
            completed,
            truncated,
        }
    }
}

impl Default for LineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_scheduler(policy: FeedPolicy) -> LineScheduler {
        LineScheduler::new()
            .with_mode(DurationMode::Min)
            .with_feed_policy(policy)
            .with_seed(Some(12345))
    }

    #[test]
    fn test_single_stage_cutoff() {
        let stages = vec![Stage::fixed("S", 10.0)];
        let out = min_scheduler(FeedPolicy::Cutoff).build(&stages, 30.0);

        assert_eq!(out.completed, 3);
        assert!(!out.truncated);
        let finishes: Vec<f64> = out.schedule.iter().map(|r| r.finish).collect();
        assert_eq!(finishes, vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_two_stage_parallel_servers() {
        let stages = vec![
            Stage::fixed("A", 10.0),
            Stage::new("B", 5.0, 5.0, 2),
        ];
        let out = min_scheduler(FeedPolicy::Continuous)
            .with_max_jobs(4)
            .with_horizon(1_000.0)
            .build(&stages, 720.0);

        let s = &out.schedule;
        assert_eq!(s.record_count(), 8);
        assert!(out.truncated);

        let expected = [
            (0, 0.0, 10.0, 10.0, 15.0),
            (1, 10.0, 20.0, 20.0, 25.0),
            (2, 20.0, 30.0, 30.0, 35.0),
            (3, 30.0, 40.0, 40.0, 45.0),
        ];
        for (job, a_start, a_finish, b_start, b_finish) in expected {
            let recs = s.records_for_job(job);
            assert_eq!(recs.len(), 2);
            assert_eq!((recs[0].start, recs[0].finish), (a_start, a_finish));
            assert_eq!((recs[1].start, recs[1].finish), (b_start, b_finish));
        }

        // Stage B: the idle server wins over the one released earlier,
        // so lanes alternate 0, 1, 0, 1.
        let lanes: Vec<usize> = s.records_for_stage(1).iter().map(|r| r.server_index).collect();
        assert_eq!(lanes, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_bottleneck_queueing() {
        // Fast first stage feeding a slow single server: jobs wait.
        let stages = vec![Stage::fixed("Fast", 1.0), Stage::fixed("Slow", 10.0)];
        let out = min_scheduler(FeedPolicy::Cutoff).build(&stages, 35.0);

        let slow = out.schedule.records_for_stage(1);
        assert_eq!((slow[0].start, slow[0].finish), (1.0, 11.0));
        assert_eq!((slow[1].start, slow[1].finish), (11.0, 21.0));
        assert_eq!((slow[2].start, slow[2].finish), (21.0, 31.0));
        assert_eq!(out.completed, 3);
        assert_eq!(out.schedule.job_count(), 4);
    }

    #[test]
    fn test_max_mode() {
        let stages = vec![Stage::new("S", 5.0, 15.0, 1)];
        let out = LineScheduler::new()
            .with_mode(DurationMode::Max)
            .build(&stages, 30.0);
        assert_eq!(out.completed, 2);
        assert_eq!(out.schedule.records[0].finish, 15.0);
    }

    #[test]
    fn test_empty_topology() {
        let out = LineScheduler::new().build(&[], 720.0);
        assert!(out.schedule.is_empty());
        assert_eq!(out.completed, 0);
        assert!(!out.truncated);
    }

    #[test]
    fn test_zero_duration_truncated_by_cap() {
        let stages = vec![Stage::fixed("Instant", 0.0)];
        let out = min_scheduler(FeedPolicy::Cutoff)
            .with_max_jobs(50)
            .build(&stages, 10.0);
        assert!(out.truncated);
        assert_eq!(out.schedule.job_count(), 50);
        assert_eq!(out.completed, 50);
    }

    #[test]
    fn test_zero_max_jobs() {
        let stages = vec![Stage::fixed("S", 1.0)];
        let out = LineScheduler::new().with_max_jobs(0).build(&stages, 10.0);
        assert!(out.schedule.is_empty());
        assert!(!out.truncated);
    }

    #[test]
    fn test_continuous_feeds_past_shift() {
        let stages = vec![Stage::fixed("S", 10.0)];
        // Default horizon: 2 * 30 = 60. Entries 0,10,...,60 are within;
        // the job entering at 70 is the last one admitted.
        let out = min_scheduler(FeedPolicy::Continuous).build(&stages, 30.0);
        assert_eq!(out.completed, 3);
        assert_eq!(out.schedule.job_count(), 8);
        let last = out.schedule.records.last().unwrap();
        assert_eq!(last.start, 70.0);
    }

    #[test]
    fn test_explicit_horizon() {
        let stages = vec![Stage::fixed("S", 10.0)];
        let sched = min_scheduler(FeedPolicy::Continuous).with_horizon(30.0);
        assert_eq!(sched.horizon_for(30.0), 30.0);
        let out = sched.build(&stages, 30.0);
        // Entries 0..=30 admitted, 40 stops
        assert_eq!(out.schedule.job_count(), 5);
    }

    #[test]
    fn test_seeded_random_reproducible() {
        let stages = vec![
            Stage::new("Gate", 20.0, 40.0, 1),
            Stage::new("QC", 30.0, 60.0, 2),
        ];
        let sched = LineScheduler::new()
            .with_mode(DurationMode::RandomPerJob)
            .with_seed(Some(123));
        let a = sched.build(&stages, 720.0);
        let b = sched.build(&stages, 720.0);
        assert_eq!(a, b);

        for r in a.schedule.iter() {
            let stage = &stages[r.stage_index];
            assert!(r.duration() >= stage.min_minutes && r.duration() <= stage.max_minutes);
        }
    }

    #[test]
    fn test_no_server_overlap() {
        let stages = vec![
            Stage::new("A", 3.0, 9.0, 2),
            Stage::new("B", 5.0, 20.0, 3),
            Stage::new("C", 1.0, 4.0, 1),
        ];
        let out = LineScheduler::new()
            .with_mode(DurationMode::RandomPerJob)
            .with_seed(Some(9))
            .build(&stages, 480.0);

        for (stage_idx, stage) in stages.iter().enumerate() {
            for server in 0..stage.servers {
                let recs = out.schedule.records_for_server(stage_idx, server);
                for (i, a) in recs.iter().enumerate() {
                    for b in recs.iter().skip(i + 1) {
                        assert!(!a.overlaps(b));
                    }
                }
            }
        }
    }

    #[test]
    fn test_feed_policy_stop_rules() {
        assert!(FeedPolicy::Cutoff.should_stop(0.0, 31.0, 30.0, 60.0));
        assert!(!FeedPolicy::Cutoff.should_stop(0.0, 30.0, 30.0, 60.0));
        assert!(!FeedPolicy::Continuous.should_stop(60.0, 500.0, 30.0, 60.0));
        assert!(FeedPolicy::Continuous.should_stop(60.5, 70.0, 30.0, 60.0));
    }
}
