//! Simulation configuration and input sanitizing.
//!
//! A `SimulationConfig` describes one what-if run: the line topology,
//! shift length, horizon, duration policy and seed. It deserializes from
//! TOML with every field optional:
//!
//! ```toml
//! shift_minutes = 720
//! shifts = 2
//! mode = "RandomPerJob"
//! composition = "Continuous"
//! seed = 123
//!
//! [[stages]]
//! name = "Gate"
//! min_minutes = 20
//! max_minutes = 40
//! servers = 1
//! ```
//!
//! The `parse_*` helpers turn free-form user input into safe values; they
//! never fail, they fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FlowlineError, Result};
use crate::models::{DurationMode, Stage};
use crate::scheduler::{Composition, ShiftComposer, DEFAULT_MAX_JOBS, MAX_SHIFTS};
use crate::validation::validate_topology;

pub use crate::scheduler::DEFAULT_SHIFT_MINUTES;

/// Seed used when a config does not specify one.
pub const DEFAULT_SEED: u64 = 12345;

fn default_shift_minutes() -> f64 {
    DEFAULT_SHIFT_MINUTES
}

fn default_seed() -> Option<u64> {
    Some(DEFAULT_SEED)
}

fn default_max_jobs() -> usize {
    DEFAULT_MAX_JOBS
}

/// One simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Shift length (minutes).
    #[serde(default = "default_shift_minutes")]
    pub shift_minutes: f64,
    /// Number of shifts; `None` uses the composition's default.
    #[serde(default)]
    pub shifts: Option<u32>,
    /// Duration policy.
    #[serde(default)]
    pub mode: DurationMode,
    /// Shift composition strategy.
    #[serde(default)]
    pub composition: Composition,
    /// Base seed; `None` draws from the OS.
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
    /// Job cap per build.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    /// Line topology in flow order.
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shift_minutes: DEFAULT_SHIFT_MINUTES,
            shifts: None,
            mode: DurationMode::default(),
            composition: Composition::default(),
            seed: default_seed(),
            max_jobs: DEFAULT_MAX_JOBS,
            stages: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Parses a TOML document.
    ///
    /// A non-finite or missing shift length falls back to the default.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: SimulationConfig = toml::from_str(contents)?;
        if !config.shift_minutes.is_finite() {
            config.shift_minutes = DEFAULT_SHIFT_MINUTES;
        }
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Reads a TOML file and rejects topologies with validation findings.
    pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Runs topology validation.
    pub fn validate(&self) -> Result<()> {
        if self.shift_minutes <= 0.0 {
            return Err(FlowlineError::Config(format!(
                "shift_minutes must be positive, got {}",
                self.shift_minutes
            )));
        }
        validate_topology(&self.stages)?;
        Ok(())
    }

    /// Composer configured from this run.
    pub fn composer(&self) -> ShiftComposer {
        ShiftComposer::new(self.shift_minutes)
            .with_shift_count(self.shifts)
            .with_composition(self.composition)
            .with_mode(self.mode)
            .with_seed(self.seed)
            .with_max_jobs(self.max_jobs)
    }

    /// Built-in reference line: tanker intake, cleaning, inspection,
    /// loading, inspection, and exit.
    pub fn reference_line() -> Vec<Stage> {
        vec![
            Stage::new("Gate (entry)", 20.0, 40.0, 1),
            Stage::new("Tank cleaning", 120.0, 120.0, 6),
            Stage::new("QC #1", 30.0, 60.0, 2),
            Stage::new("Loading", 20.0, 20.0, 1),
            Stage::new("QC #2", 30.0, 60.0, 2),
            Stage::new("Gate (exit)", 10.0, 20.0, 1),
        ]
    }
}

/// Parses a shift length.
///
/// Anything but a finite positive number falls back to 720 minutes.
pub fn parse_shift_minutes(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_SHIFT_MINUTES)
}

/// Parses a shift count.
///
/// Accepts a positive integer, or a positive number floored to at least 1,
/// capped at [`MAX_SHIFTS`]. Anything else yields `None`, leaving the
/// default to the composer.
pub fn parse_shift_count(input: &str) -> Option<u32> {
    let input = input.trim();
    let count = match input.parse::<u32>() {
        Ok(k) => (k > 0).then_some(k),
        Err(_) => match input.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Some((v.floor() as u32).max(1)),
            _ => None,
        },
    };
    count.map(|k| k.min(MAX_SHIFTS))
}
