//! Event projection for playback.

use crate::models::{Schedule, TimelineEvent};

/// Projects a schedule onto its stage-completion events.
///
/// Events are sorted ascending by finish time. The sort is stable, so
/// records finishing together keep their insertion order (job, then stage).
pub fn project(schedule: &Schedule) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = schedule
        .iter()
        .map(|r| TimelineEvent::new(r.finish, r.job_id, r.stage_index))
        .collect();
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}
