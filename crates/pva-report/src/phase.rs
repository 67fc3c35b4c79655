//! Phase identifiers, report ids and confidence arithmetic

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// The three phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Discovery: survey the working directory and the vision
    Explore,
    /// Planning: derive a dependency-ordered implementation plan
    Plan,
    /// Completion: execute, validate and heal
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Explore => write!(f, "explore"),
            Phase::Plan => write!(f, "plan"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// Unique report identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Ulid);

impl ReportId {
    /// Generate new report ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clamp a confidence score into `[0, 1]`
///
/// Non-finite inputs collapse to `0.0` so a bad intermediate computation can
/// never leak NaN into a report.
#[inline]
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Clamp a confidence score into `[0.1, 1]`
///
/// Planning and completion reports never drop below the 0.1 floor.
#[inline]
#[must_use]
pub fn clamp_confidence_floor(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.1, 1.0)
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_id_generation() {
        let id1 = ReportId::new();
        let id2 = ReportId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn confidence_clamped_to_unit_interval() {
        assert_eq!(clamp_confidence(1.4), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(0.55), 0.55);
    }

    #[test]
    fn confidence_floor_applies() {
        assert_eq!(clamp_confidence_floor(0.0), 0.1);
        assert_eq!(clamp_confidence_floor(2.0), 1.0);
    }

    #[test]
    fn non_finite_confidence_collapses() {
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence_floor(f64::INFINITY), 1.0);
        assert_eq!(clamp_confidence_floor(f64::NAN), 0.1);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Explore.to_string(), "explore");
        assert_eq!(Phase::Complete.to_string(), "complete");
    }
}
