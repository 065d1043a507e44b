//! Schedule (build output) model.
//!
//! A schedule is the full timeline of one build: one record per
//! (job, stage) pair actually scheduled, in insertion order
//! (job ascending, then stage ascending). Schedules are values; the
//! shift composer copies and offsets records, it never mutates a
//! schedule it did not build.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One job's visit to one stage.
///
/// Invariant: `finish = start + duration`, `0 <= start <= finish`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobStageRecord {
    /// Job identifier (0-indexed, unique within a schedule).
    pub job_id: usize,
    /// Stage position in the topology.
    pub stage_index: usize,
    /// Server lane within the stage.
    pub server_index: usize,
    /// Processing start (minutes).
    pub start: f64,
    /// Processing end (minutes).
    pub finish: f64,
}

impl JobStageRecord {
    /// Creates a new record.
    pub fn new(
        job_id: usize,
        stage_index: usize,
        server_index: usize,
        start: f64,
        finish: f64,
    ) -> Self {
        Self {
            job_id,
            stage_index,
            server_index,
            start,
            finish,
        }
    }

    /// Processing duration (finish - start) in minutes.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }

    /// Copy shifted by `minutes` in time and `jobs` in id.
    pub fn offset(&self, minutes: f64, jobs: usize) -> Self {
        Self {
            job_id: self.job_id + jobs,
            start: self.start + minutes,
            finish: self.finish + minutes,
            ..*self
        }
    }

    /// Whether `[start, finish)` intersects `[other.start, other.finish)`.
    pub fn overlaps(&self, other: &JobStageRecord) -> bool {
        self.start < other.finish && other.start < self.finish
    }
}

/// Completion count for one shift of the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSummary {
    /// Shift position in the horizon (0-indexed).
    pub shift_index: usize,
    /// Jobs that left the last stage within this shift.
    pub completed: usize,
}

impl ShiftSummary {
    /// Creates a new summary.
    pub fn new(shift_index: usize, completed: usize) -> Self {
        Self {
            shift_index,
            completed,
        }
    }
}

/// Timeline of a build: every job-stage record plus the topology length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Number of stages of the topology the schedule was built for.
    pub stage_count: usize,
    /// Records in insertion order (job ascending, stage ascending).
    pub records: Vec<JobStageRecord>,
}

impl Schedule {
    /// Creates an empty schedule for a topology of `stage_count` stages.
    pub fn new(stage_count: usize) -> Self {
        Self {
            stage_count,
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn add_record(&mut self, record: JobStageRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the schedule holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &JobStageRecord> {
        self.records.iter()
    }

    /// Latest finish across all records (minutes).
    pub fn makespan(&self) -> f64 {
        self.records.iter().map(|r| r.finish).fold(0.0, f64::max)
    }

    /// Number of distinct jobs.
    pub fn job_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.job_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Highest job id, if any.
    pub fn max_job_id(&self) -> Option<usize> {
        self.records.iter().map(|r| r.job_id).max()
    }

    /// Records for a given job, in stage order.
    pub fn records_for_job(&self, job_id: usize) -> Vec<&JobStageRecord> {
        self.records.iter().filter(|r| r.job_id == job_id).collect()
    }

    /// Records for a given stage.
    pub fn records_for_stage(&self, stage_index: usize) -> Vec<&JobStageRecord> {
        self.records
            .iter()
            .filter(|r| r.stage_index == stage_index)
            .collect()
    }

    /// Records processed on one server lane.
    pub fn records_for_server(
        &self,
        stage_index: usize,
        server_index: usize,
    ) -> Vec<&JobStageRecord> {
        self.records
            .iter()
            .filter(|r| r.stage_index == stage_index && r.server_index == server_index)
            .collect()
    }

    /// Last-stage records as `(job_id, exit_time)`, in insertion order.
    pub fn job_exits(&self) -> Vec<(usize, f64)> {
        let Some(last) = self.stage_count.checked_sub(1) else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|r| r.stage_index == last)
            .map(|r| (r.job_id, r.finish))
            .collect()
    }

    /// First-stage records as `(job_id, entry_time)`, in insertion order.
    pub fn job_entries(&self) -> Vec<(usize, f64)> {
        self.records
            .iter()
            .filter(|r| r.stage_index == 0)
            .map(|r| (r.job_id, r.start))
            .collect()
    }

    /// Jobs that left the last stage at or before `minutes`.
    pub fn completed_by(&self, minutes: f64) -> usize {
        self.job_exits().iter().filter(|&&(_, t)| t <= minutes).count()
    }

    /// Total processing time on one server lane (minutes).
    pub fn busy_minutes(&self, stage_index: usize, server_index: usize) -> f64 {
        self.records_for_server(stage_index, server_index)
            .iter()
            .map(|r| r.duration())
            .sum()
    }

    /// Server busy fraction over `horizon` minutes.
    ///
    /// Returns `None` if `horizon` is not positive.
    pub fn server_utilization(
        &self,
        stage_index: usize,
        server_index: usize,
        horizon: f64,
    ) -> Option<f64> {
        if horizon <= 0.0 {
            return None;
        }
        Some(self.busy_minutes(stage_index, server_index) / horizon)
    }

    /// Copy of this schedule shifted by `minutes` in time and `jobs` in id.
    pub fn offset(&self, minutes: f64, jobs: usize) -> Schedule {
        Schedule {
            stage_count: self.stage_count,
            records: self.records.iter().map(|r| r.offset(minutes, jobs)).collect(),
        }
    }

    /// Moves all records of `other` to the end of this schedule.
    pub fn append(&mut self, other: Schedule) {
        self.stage_count = self.stage_count.max(other.stage_count);
        self.records.extend(other.records);
    }
}
