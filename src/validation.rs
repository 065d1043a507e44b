//! Input validation for line topologies.
//!
//! The scheduler is total over any input, so validation is advisory: it
//! reports topologies that would produce meaningless estimates. Detects:
//! - Non-finite processing times
//! - Negative processing times
//! - Inverted ranges (max < min)
//! - Stages without servers
//! - Lines where every stage takes zero time (only the job cap ends a build)

use std::fmt;

use crate::models::Stage;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A processing-time bound is NaN or infinite.
    NonFiniteDuration,
    /// A processing-time bound is below zero.
    NegativeDuration,
    /// `max_minutes` is below `min_minutes`.
    InvertedRange,
    /// A stage declares zero servers.
    NoServers,
    /// Every stage has a zero upper bound.
    ZeroCycleTime,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a line topology.
///
/// Checks, per stage:
/// 1. Both bounds are finite
/// 2. Both bounds are non-negative
/// 3. `min_minutes <= max_minutes`
/// 4. At least one server
///
/// and for the whole line that at least one stage can take non-zero time.
/// An empty topology is valid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_topology(stages: &[Stage]) -> ValidationResult {
    let mut errors = Vec::new();

    for (idx, stage) in stages.iter().enumerate() {
        let label = format!("Stage {} '{}'", idx + 1, stage.name);

        if !stage.min_minutes.is_finite() || !stage.max_minutes.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteDuration,
                format!("{label} has a non-finite processing time"),
            ));
            continue;
        }

        if stage.min_minutes < 0.0 || stage.max_minutes < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("{label} has a negative processing time"),
            ));
        }

        if stage.max_minutes < stage.min_minutes {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedRange,
                format!(
                    "{label}: max {} is below min {}",
                    stage.max_minutes, stage.min_minutes
                ),
            ));
        }

        if stage.servers == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoServers,
                format!("{label} has no servers"),
            ));
        }
    }

    if !stages.is_empty() && stages.iter().all(|s| s.max_minutes == 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroCycleTime,
            "Every stage takes zero time; builds will run to the job cap",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
