//! Processing-time policy.
//!
//! Decides how long one job occupies one stage. Three policies:
//!
//! | Mode | Draw |
//! |------|------|
//! | `Min` | `stage.min_minutes` |
//! | `Max` | `stage.max_minutes` |
//! | `RandomPerJob` | uniform integer in `[round(min), round(max)]` |
//!
//! Under `RandomPerJob` exactly one value is drawn per (job, stage) pair,
//! in job-ascending then stage-ascending order, so a fixed seed reproduces
//! the whole schedule. A degenerate range (`min == max`) consumes no draw.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Stage;

/// How per-stage processing times are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationMode {
    /// Lower bound of every stage (optimistic line).
    #[default]
    Min,
    /// Upper bound of every stage (pessimistic line).
    Max,
    /// Fresh uniform integer draw per job and stage.
    RandomPerJob,
}

impl DurationMode {
    /// Draws one processing time for `stage`.
    ///
    /// Rounding of the bounds is half-to-even. A reversed range is drawn
    /// from its ordered bounds instead of panicking.
    pub fn draw<R: Rng + ?Sized>(self, stage: &Stage, rng: &mut R) -> f64 {
        match self {
            DurationMode::Min => stage.min_minutes,
            DurationMode::Max => stage.max_minutes,
            DurationMode::RandomPerJob => {
                if stage.is_fixed() {
                    return stage.min_minutes;
                }
                let lo = stage.min_minutes.round_ties_even() as i64;
                let hi = stage.max_minutes.round_ties_even() as i64;
                rng.random_range(lo.min(hi)..=lo.max(hi)) as f64
            }
        }
    }

    /// Whether draws depend on the random source.
    pub fn is_random(self) -> bool {
        matches!(self, DurationMode::RandomPerJob)
    }

    /// All modes, in the order a throughput report lists them.
    pub fn all() -> [DurationMode; 3] {
        [DurationMode::Min, DurationMode::Max, DurationMode::RandomPerJob]
    }
}

impl fmt::Display for DurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DurationMode::Min => "Min",
            DurationMode::Max => "Max",
            DurationMode::RandomPerJob => "Random",
        };
        f.write_str(label)
    }
}

/// Parses a mode selector label.
///
/// `"min"` and `"max"` (any case) select the fixed modes; every other label
/// selects `RandomPerJob`. Parsing never fails.
impl FromStr for DurationMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "min" => DurationMode::Min,
            "max" => DurationMode::Max,
            _ => DurationMode::RandomPerJob,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_modes_ignore_rng() {
        let stage = Stage::new("QC", 30.0, 60.0, 2);
        let mut rng = StdRng::seed_from_u64(1);
        assert!((DurationMode::Min.draw(&stage, &mut rng) - 30.0).abs() < 1e-10);
        assert!((DurationMode::Max.draw(&stage, &mut rng) - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_random_within_rounded_range() {
        let stage = Stage::new("QC", 30.0, 60.0, 2);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let d = DurationMode::RandomPerJob.draw(&stage, &mut rng);
            assert!((30.0..=60.0).contains(&d));
            assert_eq!(d.fract(), 0.0);
        }
    }

    #[test]
    fn test_random_degenerate_range_consumes_nothing() {
        let fixed = Stage::fixed("Cleaning", 120.0);
        let ranged = Stage::new("QC", 30.0, 60.0, 1);

        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);

        assert!((DurationMode::RandomPerJob.draw(&fixed, &mut a) - 120.0).abs() < 1e-10);
        // `a` has not advanced, so both sources now agree.
        let da = DurationMode::RandomPerJob.draw(&ranged, &mut a);
        let db = DurationMode::RandomPerJob.draw(&ranged, &mut b);
        assert_eq!(da, db);
    }

    #[test]
    fn test_random_rounds_half_to_even() {
        // [2.5, 3.4] rounds to [2, 3]
        let stage = Stage::new("S", 2.5, 3.4, 1);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let d = DurationMode::RandomPerJob.draw(&stage, &mut rng);
            assert!(d == 2.0 || d == 3.0);
        }
    }

    #[test]
    fn test_random_reversed_range() {
        let stage = Stage::new("S", 10.0, 5.0, 1);
        let mut rng = StdRng::seed_from_u64(5);
        let d = DurationMode::RandomPerJob.draw(&stage, &mut rng);
        assert!((5.0..=10.0).contains(&d));
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Min".parse::<DurationMode>().unwrap(), DurationMode::Min);
        assert_eq!(" MAX ".parse::<DurationMode>().unwrap(), DurationMode::Max);
        assert_eq!(
            "Random".parse::<DurationMode>().unwrap(),
            DurationMode::RandomPerJob
        );
        assert_eq!("".parse::<DurationMode>().unwrap(), DurationMode::RandomPerJob);
        assert_eq!(DurationMode::default(), DurationMode::Min);
    }

    #[test]
    fn test_display() {
        assert_eq!(DurationMode::Min.to_string(), "Min");
        assert_eq!(DurationMode::RandomPerJob.to_string(), "Random");
        assert!(DurationMode::RandomPerJob.is_random());
        assert!(!DurationMode::Max.is_random());
    }
}
