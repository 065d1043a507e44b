//! Flow-line domain models.
//!
//! Provides the value types describing a line (stages), its duration
//! policy, and the outputs of a build (records, schedules, shift
//! summaries, timeline events).
//!
//! # Domain Mappings
//!
//! | u-flowline | Manufacturing | Logistics | Service |
//! |------------|--------------|-----------|---------|
//! | Stage | Workstation | Dock / Gate | Counter |
//! | Server | Machine / Post | Bay | Clerk |
//! | Job | Unit / Order | Truck | Customer |
//! | Schedule | Line timeline | Yard plan | Queue trace |

mod duration;
mod event;
mod schedule;
mod stage;

pub use duration::DurationMode;
pub use event::TimelineEvent;
pub use schedule::{JobStageRecord, Schedule, ShiftSummary};
pub use stage::Stage;
