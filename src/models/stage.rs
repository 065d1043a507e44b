//! Stage (processing station) model.
//!
//! A stage is one station of the flow line. Every job visits every stage
//! in topology order; a stage owns one or more identical parallel servers
//! (posts, bays, machines) and a processing-time range in minutes.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 2.1 (Flexible Flow Shop)

use serde::{Deserialize, Deserializer, Serialize};

/// A processing station of the line.
///
/// The topology is simply an ordered slice of stages (`&[Stage]`);
/// an empty topology is valid and yields an empty schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Display name.
    pub name: String,
    /// Lower bound of the processing time (minutes).
    pub min_minutes: f64,
    /// Upper bound of the processing time (minutes).
    pub max_minutes: f64,
    /// Number of parallel servers (clamped to at least 1 by constructors
    /// and on deserialization).
    #[serde(deserialize_with = "deserialize_servers")]
    pub servers: usize,
}

impl Stage {
    /// Creates a stage with a processing-time range and server count.
    ///
    /// `servers` is clamped to at least 1.
    pub fn new(name: impl Into<String>, min_minutes: f64, max_minutes: f64, servers: usize) -> Self {
        Self {
            name: name.into(),
            min_minutes,
            max_minutes,
            servers: servers.max(1),
        }
    }

    /// Creates a single-server stage with a fixed processing time.
    pub fn fixed(name: impl Into<String>, minutes: f64) -> Self {
        Self::new(name, minutes, minutes, 1)
    }

    /// Sets the processing-time range.
    pub fn with_range(mut self, min_minutes: f64, max_minutes: f64) -> Self {
        self.min_minutes = min_minutes;
        self.max_minutes = max_minutes;
        self
    }

    /// Sets the number of parallel servers (clamped to at least 1).
    pub fn with_servers(mut self, servers: usize) -> Self {
        self.servers = servers.max(1);
        self
    }

    /// Server count as used by the scheduler (never zero).
    #[inline]
    pub fn server_count(&self) -> usize {
        self.servers.max(1)
    }

    /// Whether the processing time is a single value.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.min_minutes == self.max_minutes
    }

    /// Theoretical capacity in jobs per minute for a given processing time:
    /// servers / minutes. `None` for zero-length processing.
    pub fn capacity_per_minute(&self, minutes: f64) -> Option<f64> {
        if minutes <= 0.0 {
            return None;
        }
        Some(self.server_count() as f64 / minutes)
    }
}

fn deserialize_servers<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(usize::deserialize(deserializer)?.max(1))
}

impl Default for Stage {
    fn default() -> Self {
        Self::new("Stage", 10.0, 10.0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_builder() {
        let s = Stage::new("Cleaning", 120.0, 120.0, 6);
        assert_eq!(s.name, "Cleaning");
        assert_eq!(s.servers, 6);
        assert!(s.is_fixed());

        let s = Stage::fixed("Loading", 20.0).with_range(20.0, 30.0).with_servers(2);
        assert!(!s.is_fixed());
        assert_eq!(s.server_count(), 2);
    }

    #[test]
    fn test_server_count_clamped() {
        assert_eq!(Stage::new("S", 1.0, 1.0, 0).servers, 1);
        assert_eq!(Stage::default().with_servers(0).servers, 1);

        // Direct field writes bypass the clamp; the scheduler still sees 1.
        let mut s = Stage::default();
        s.servers = 0;
        assert_eq!(s.server_count(), 1);
    }

    #[test]
    fn test_capacity_per_minute() {
        let s = Stage::new("QC", 30.0, 60.0, 2);
        assert!((s.capacity_per_minute(30.0).unwrap() - 2.0 / 30.0).abs() < 1e-10);
        assert!(s.capacity_per_minute(0.0).is_none());
    }

    #[test]
    fn test_stage_serde() {
        let s = Stage::new("Gate", 20.0, 40.0, 1);
        let json = serde_json::to_string(&s).unwrap();
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_deserialize_clamps_servers() {
        let json = r#"{"name":"X","min_minutes":1,"max_minutes":1,"servers":0}"#;
        let s: Stage = serde_json::from_str(json).unwrap();
        assert_eq!(s.servers, 1);

        let s: Stage =
            toml::from_str("name = \"Y\"\nmin_minutes = 5\nmax_minutes = 5\nservers = 0\n")
                .unwrap();
        assert_eq!(s.servers, 1);
    }
}
