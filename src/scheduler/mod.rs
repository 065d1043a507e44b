//! Flow-line schedule building, shift composition, and KPI evaluation.
//!
//! # Algorithm
//!
//! `LineScheduler` feeds identical jobs through a linear sequence of
//! stages, assigning each job at each stage to the earliest-free parallel
//! server. It is a fixed greedy policy, not an optimizer: it estimates the
//! throughput a line reaches, it does not search for a better sequence.
//!
//! `ShiftComposer` covers several shifts, either as independent runs from
//! an empty line or as one continuous run whose completions are bucketed
//! per shift.
//!
//! # KPI
//!
//! `LineKpi` computes throughput, flow time, utilization, and the
//! bottleneck stage.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 6
//! - Hopp & Spearman (2011), "Factory Physics"

mod composer;
mod kpi;
mod line;
mod projection;
mod servers;

pub use composer::{
    bucket_exits, Composition, HorizonOutcome, ShiftComposer, DEFAULT_SHIFT_MINUTES, MAX_SHIFTS,
};
pub use kpi::LineKpi;
pub use line::{BuildOutcome, FeedPolicy, LineScheduler, DEFAULT_MAX_JOBS};
pub use projection::project;
pub use servers::ServerPool;
