//! Timeline event model.
//!
//! An event marks a job leaving a stage. Events are derived from a
//! schedule by the projection in `scheduler::project` and consumed by
//! playback.

use serde::{Deserialize, Serialize};

/// A job finishing a stage at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Completion time of the stage (minutes).
    pub time: f64,
    /// Job identifier.
    pub job_id: usize,
    /// Stage the job just left.
    pub stage_index: usize,
}

impl TimelineEvent {
    /// Creates a new event.
    pub fn new(time: f64, job_id: usize, stage_index: usize) -> Self {
        Self {
            time,
            job_id,
            stage_index,
        }
    }

    /// Whether this event is the job's exit from a line of `stage_count` stages.
    pub fn is_exit(&self, stage_count: usize) -> bool {
        stage_count > 0 && self.stage_index == stage_count - 1
    }
}
