//! Placement pipeline: ordering, overlap-avoiding search along a path, and run events.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod events;
pub mod overlap;
pub mod runner;
pub mod sequencer;

pub const DEFAULT_MAX_TRIALS: usize = 25;
pub const DEFAULT_OVERLAP_BUFFER: f64 = 2.0;
pub const DEFAULT_MIN_RETRY_STEP: f64 = 10.0;
pub const DEFAULT_SPACING_TOLERANCE: f64 = 1e-3;

/// Where the first instance of a run lands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstPlacement {
    /// The first instance is placed at distance 0, before any advance.
    #[default]
    AtOrigin,
    /// The first instance is advanced by `0 + radius + spacing` like every other.
    Advanced,
}

/// Tuning for placement runs and re-application.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Overlap retries per instance before it is skipped.
    pub max_trials: usize,
    /// Extra clearance between bounding spheres.
    pub overlap_buffer: f64,
    /// Lower bound of the distance step taken after a rejected trial.
    pub min_retry_step: f64,
    /// Constant added to every advance.
    pub advance_epsilon: f64,
    /// First-instance policy.
    pub first_placement: FirstPlacement,
    /// Spacing differences at or below this are treated as unchanged on apply.
    pub spacing_tolerance: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_trials: DEFAULT_MAX_TRIALS,
            overlap_buffer: DEFAULT_OVERLAP_BUFFER,
            min_retry_step: DEFAULT_MIN_RETRY_STEP,
            advance_epsilon: 0.0,
            first_placement: FirstPlacement::AtOrigin,
            spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
        }
    }
}

impl PlacementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    pub fn with_overlap_buffer(mut self, overlap_buffer: f64) -> Self {
        self.overlap_buffer = overlap_buffer;
        self
    }

    pub fn with_min_retry_step(mut self, min_retry_step: f64) -> Self {
        self.min_retry_step = min_retry_step;
        self
    }

    pub fn with_advance_epsilon(mut self, advance_epsilon: f64) -> Self {
        self.advance_epsilon = advance_epsilon;
        self
    }

    pub fn with_first_placement(mut self, first_placement: FirstPlacement) -> Self {
        self.first_placement = first_placement;
        self
    }

    pub fn with_spacing_tolerance(mut self, spacing_tolerance: f64) -> Self {
        self.spacing_tolerance = spacing_tolerance;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_trials == 0 {
            return Err(Error::InvalidConfig("max_trials must be >= 1".into()));
        }
        if !self.overlap_buffer.is_finite() || self.overlap_buffer < 0.0 {
            return Err(Error::InvalidConfig(
                "overlap_buffer must be finite and >= 0".into(),
            ));
        }
        // A zero step could retry the same rejected spot forever.
        if !self.min_retry_step.is_finite() || self.min_retry_step <= 0.0 {
            return Err(Error::InvalidConfig("min_retry_step must be > 0".into()));
        }
        if !self.advance_epsilon.is_finite() || self.advance_epsilon < 0.0 {
            return Err(Error::InvalidConfig(
                "advance_epsilon must be finite and >= 0".into(),
            ));
        }
        if !self.spacing_tolerance.is_finite() || self.spacing_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "spacing_tolerance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PlacementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_trials, 25);
        assert_eq!(config.first_placement, FirstPlacement::AtOrigin);
    }

    #[test]
    fn builder_sets_fields() {
        let config = PlacementConfig::new()
            .with_max_trials(3)
            .with_overlap_buffer(0.5)
            .with_min_retry_step(1.0)
            .with_advance_epsilon(0.1)
            .with_first_placement(FirstPlacement::Advanced)
            .with_spacing_tolerance(0.01);
        assert_eq!(config.max_trials, 3);
        assert_eq!(config.overlap_buffer, 0.5);
        assert_eq!(config.min_retry_step, 1.0);
        assert_eq!(config.advance_epsilon, 0.1);
        assert_eq!(config.first_placement, FirstPlacement::Advanced);
        assert_eq!(config.spacing_tolerance, 0.01);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(PlacementConfig::new().with_max_trials(0).validate().is_err());
        assert!(PlacementConfig::new()
            .with_min_retry_step(0.0)
            .validate()
            .is_err());
        assert!(PlacementConfig::new()
            .with_overlap_buffer(f64::NAN)
            .validate()
            .is_err());
        assert!(PlacementConfig::new()
            .with_advance_epsilon(-1.0)
            .validate()
            .is_err());
    }
}
