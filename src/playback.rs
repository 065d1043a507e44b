//! Replay of a schedule's event stream.
//!
//! `Playback` walks a chronologically sorted event list with a simulated
//! clock, releasing events as the clock passes them and keeping a bounded
//! log of the most recent ones (newest first). The helpers below answer
//! what a line view needs at a given instant: which jobs are on which
//! server lane, and how far along they are.

use std::collections::VecDeque;

use crate::models::{JobStageRecord, Schedule, Stage, TimelineEvent};

/// Default size of the recent-events log.
pub const DEFAULT_LOG_CAPACITY: usize = 400;

/// Clock-driven cursor over timeline events.
#[derive(Debug, Clone)]
pub struct Playback {
    events: Vec<TimelineEvent>,
    cursor: usize,
    clock: f64,
    recent: VecDeque<TimelineEvent>,
    capacity: usize,
}

impl Playback {
    /// Creates a playback at t = 0 over `events` (already sorted by time).
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        Self::with_capacity(events, DEFAULT_LOG_CAPACITY)
    }

    /// Creates a playback with a custom log capacity.
    pub fn with_capacity(events: Vec<TimelineEvent>, capacity: usize) -> Self {
        Self {
            events,
            cursor: 0,
            clock: 0.0,
            recent: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
        }
    }

    /// Current clock (minutes).
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Events not yet released.
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    /// Advances the clock by `minutes` and returns the events passed.
    pub fn advance(&mut self, minutes: f64) -> Vec<TimelineEvent> {
        let target = self.clock + minutes.max(0.0);
        self.advance_to(target)
    }

    /// Moves the clock to `time` (never backwards) and returns every event
    /// with `event.time <= time` not released before, in order.
    pub fn advance_to(&mut self, time: f64) -> Vec<TimelineEvent> {
        self.clock = self.clock.max(time);

        let mut released = Vec::new();
        while let Some(&event) = self.events.get(self.cursor) {
            if event.time > self.clock {
                break;
            }
            self.cursor += 1;
            self.push_recent(event);
            released.push(event);
        }
        released
    }

    fn push_recent(&mut self, event: TimelineEvent) {
        if self.capacity == 0 {
            return;
        }
        self.recent.push_front(event);
        self.recent.truncate(self.capacity);
    }

    /// Recent events, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.recent.iter()
    }

    /// Rewinds to t = 0 and clears the log.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.clock = 0.0;
        self.recent.clear();
    }

    /// Whether the clock ran past the horizon (with one minute of slack).
    pub fn is_finished(&self, horizon_minutes: f64) -> bool {
        self.clock > horizon_minutes + 1.0
    }
}

/// A job in process at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveJob {
    /// The record being processed.
    pub record: JobStageRecord,
    /// Fraction of processing done, in `[0, 1]`.
    pub progress: f64,
}

/// Records in process at `time` (`start <= time <= finish`).
///
/// Zero-length records report progress 1.
pub fn active_jobs(schedule: &Schedule, time: f64) -> Vec<ActiveJob> {
    schedule
        .iter()
        .filter(|r| r.start <= time && time <= r.finish)
        .map(|r| {
            let span = r.duration();
            let progress = if span > 0.0 {
                ((time - r.start) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            ActiveJob {
                record: *r,
                progress,
            }
        })
        .collect()
}

/// Flat lane index of a server across the whole line.
///
/// Lanes are numbered stage by stage: all servers of stage 0, then stage 1.
pub fn lane_index(stages: &[Stage], stage_index: usize, server_index: usize) -> usize {
    stages
        .iter()
        .take(stage_index)
        .map(Stage::server_count)
        .sum::<usize>()
        + server_index
}

/// Total number of server lanes of the line.
pub fn lane_count(stages: &[Stage]) -> usize {
    stages.iter().map(Stage::server_count).sum()
}

/// Human-readable log line for an event.
pub fn describe(event: &TimelineEvent, stages: &[Stage]) -> String {
    let stage = stages
        .get(event.stage_index)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| format!("Stage {}", event.stage_index + 1));
    format!(
        "t={:.1} min: job #{} passed {}",
        event.time,
        event.job_id + 1,
        stage
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{project, LineScheduler};

    fn events() -> Vec<TimelineEvent> {
        vec![
            TimelineEvent::new(10.0, 0, 0),
            TimelineEvent::new(15.0, 0, 1),
            TimelineEvent::new(20.0, 1, 0),
            TimelineEvent::new(25.0, 1, 1),
        ]
    }

    #[test]
    fn test_advance_releases_in_order() {
        let mut p = Playback::new(events());
        assert!(p.advance(5.0).is_empty());
        let got = p.advance(10.0);
        assert_eq!(got, vec![TimelineEvent::new(10.0, 0, 0), TimelineEvent::new(15.0, 0, 1)]);
        assert!((p.clock() - 15.0).abs() < 1e-10);
        assert_eq!(p.remaining(), 2);

        let got = p.advance_to(100.0);
        assert_eq!(got.len(), 2);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut p = Playback::new(events());
        p.advance_to(20.0);
        assert!(p.advance_to(5.0).is_empty());
        assert!((p.clock() - 20.0).abs() < 1e-10);
        assert!(p.advance(-3.0).is_empty());
    }

    #[test]
    fn test_recent_bounded_newest_first() {
        let mut p = Playback::with_capacity(events(), 2);
        p.advance_to(30.0);
        let recent: Vec<_> = p.recent().copied().collect();
        assert_eq!(recent, vec![TimelineEvent::new(25.0, 1, 1), TimelineEvent::new(20.0, 1, 0)]);
    }

    #[test]
    fn test_reset_and_finished() {
        let mut p = Playback::new(events());
        p.advance_to(31.5);
        assert!(p.is_finished(30.0));
        p.reset();
        assert_eq!(p.remaining(), 4);
        assert_eq!(p.recent().count(), 0);
        assert!(!p.is_finished(30.0));
    }

    #[test]
    fn test_active_jobs_progress() {
        let stages = vec![Stage::fixed("A", 10.0), Stage::fixed("B", 0.0)];
        let out = LineScheduler::new().build(&stages, 30.0);

        let active = active_jobs(&out.schedule, 5.0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].record.job_id, 0);
        assert!((active[0].progress - 0.5).abs() < 1e-10);

        // At 10: job 0 leaves A and passes the zero-length B; job 1 enters A.
        let active = active_jobs(&out.schedule, 10.0);
        assert_eq!(active.len(), 3);
        let b = active.iter().find(|a| a.record.stage_index == 1).unwrap();
        assert!((b.progress - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_lane_index() {
        let stages = vec![
            Stage::new("A", 1.0, 1.0, 1),
            Stage::new("B", 1.0, 1.0, 3),
            Stage::new("C", 1.0, 1.0, 2),
        ];
        assert_eq!(lane_index(&stages, 0, 0), 0);
        assert_eq!(lane_index(&stages, 1, 2), 3);
        assert_eq!(lane_index(&stages, 2, 1), 5);
        assert_eq!(lane_count(&stages), 6);
    }

    #[test]
    fn test_describe() {
        let stages = vec![Stage::fixed("Loading", 20.0)];
        let e = TimelineEvent::new(20.0, 0, 0);
        assert_eq!(describe(&e, &stages), "t=20.0 min: job #1 passed Loading");
        let e = TimelineEvent::new(7.34, 4, 3);
        assert_eq!(describe(&e, &stages), "t=7.3 min: job #5 passed Stage 4");
    }

    #[test]
    fn test_playback_over_projection() {
        let stages = vec![Stage::fixed("S", 10.0)];
        let out = LineScheduler::new().build(&stages, 30.0);
        let mut p = Playback::new(project(&out.schedule));
        let passed = p.advance_to(30.0);
        assert_eq!(passed.len(), 3);
        assert!(passed.iter().all(|e| e.is_exit(stages.len())));
    }
}
