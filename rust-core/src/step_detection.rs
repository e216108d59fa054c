//! Step Detection Module.
//!
//! Detects footsteps with a double-threshold hysteresis state machine over
//! the vertical (z-axis) acceleration channel:
//! - rising to or above the upper threshold arms the detector
//! - falling back to or below the lower threshold fires one detection and
//!   disarms
//!
//! Exactly one detection per up/down excursion. Jitter that never crosses
//! both thresholds produces none.

use serde::Deserialize;

/// Configuration for step detection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StepDetectorConfig {
    /// Acceleration (m/s²) at or above which a step cycle starts.
    pub upper_threshold: f32,
    /// Acceleration (m/s²) at or below which an armed cycle completes.
    /// Must be below `upper_threshold`.
    pub lower_threshold: f32,
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            upper_threshold: 11.5, // ~1.17 g, heel strike peak
            lower_threshold: 6.5,  // ~0.66 g, unloading after the strike
        }
    }
}

/// Hysteresis step detector.
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: StepDetectorConfig,
    armed: bool,
    total_steps: u64,
}

impl StepDetector {
    /// Create a new step detector with the given thresholds.
    pub fn new(config: StepDetectorConfig) -> Self {
        debug_assert!(config.upper_threshold > config.lower_threshold);
        Self {
            config,
            armed: false,
            total_steps: 0,
        }
    }

    /// Feed one vertical acceleration value.
    ///
    /// Returns true exactly on the sample that completes a step cycle.
    pub fn observe(&mut self, vertical_accel: f32) -> bool {
        if !self.armed {
            if vertical_accel >= self.config.upper_threshold {
                self.armed = true;
            }
            return false;
        }

        if vertical_accel <= self.config.lower_threshold {
            self.armed = false;
            self.total_steps += 1;
            return true;
        }

        false
    }

    /// Feed a batch of values and return the indices that completed a step.
    pub fn observe_batch(&mut self, values: &[f32]) -> Vec<usize> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| self.observe(v).then_some(i))
            .collect()
    }

    /// Whether an upward crossing has been seen and the cycle is pending.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Get the total number of steps detected.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn config(&self) -> &StepDetectorConfig {
        &self.config
    }
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(StepDetectorConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
