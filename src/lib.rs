//! Flow-line throughput estimation for the U-Engine ecosystem.
//!
//! Estimates how many jobs a linear production line (stations with
//! parallel servers) completes per shift, under optimistic, pessimistic,
//! or randomized processing times. Builds are deterministic for a given
//! seed and produce a full job/stage/server timeline for playback.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Stage`, `DurationMode`, `JobStageRecord`,
//!   `Schedule`, `ShiftSummary`, `TimelineEvent`
//! - **`scheduler`**: `LineScheduler` (single build), `ShiftComposer`
//!   (multi-shift horizon), `project` (event stream), `LineKpi`
//! - **`playback`**: Clock-driven replay of the event stream
//! - **`validation`**: Topology integrity checks
//! - **`config`**: TOML configuration and input sanitizing
//!
//! # Architecture
//!
//! The core holds no state between calls: every edit of the line or its
//! parameters is answered by a fresh build. Presentation (canvas, grids,
//! timers) is left to callers; the bundled binary is a console report.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 6
//! - Hopp & Spearman (2011), "Factory Physics"

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod playback;
pub mod scheduler;
pub mod validation;
