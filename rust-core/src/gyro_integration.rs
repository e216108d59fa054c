//! Gyroscope Integration Module.
//!
//! Turns raw (uncalibrated) angular-rate samples into per-sample rotation
//! increments:
//! - elapsed time from consecutive timestamps (ns → s)
//! - zero-rate bias learned as the running mean of the first N samples,
//!   while the device is assumed to be at rest
//! - per-axis noise gate that zeroes increments too small to be motion
//!
//! Non-monotonic timestamps produce a zero increment, never a reversed one.

use log::{info, warn};
use serde::Deserialize;

use crate::types::DeltaOrientation;

const NS_TO_S: f64 = 1.0e-9;

/// Configuration for gyroscope integration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GyroIntegratorConfig {
    /// Number of initial samples averaged into the zero-rate bias.
    /// Zero disables bias estimation.
    pub calibration_samples: u32,
    /// Per-axis increments (rad) smaller than this are clamped to zero.
    pub noise_gate: f32,
}

impl Default for GyroIntegratorConfig {
    fn default() -> Self {
        Self {
            calibration_samples: 300, // ~1.5 s at 200 Hz
            noise_gate: 0.0025,
        }
    }
}

/// Gyroscope integrator with startup bias estimation.
#[derive(Debug, Clone)]
pub struct GyroIntegrator {
    config: GyroIntegratorConfig,

    // Timing
    prev_timestamp_ns: Option<u64>,

    // Bias estimation
    bias_sum: [f64; 3],
    bias_samples: u32,
    bias: [f32; 3],
}

impl GyroIntegrator {
    pub fn new(config: GyroIntegratorConfig) -> Self {
        Self {
            config,
            prev_timestamp_ns: None,
            bias_sum: [0.0; 3],
            bias_samples: 0,
            bias: [0.0; 3],
        }
    }

    /// Integrate one angular-rate sample (rad/s) into a rotation increment.
    ///
    /// The first call after construction or [`reset`](Self::reset) only
    /// records the timestamp and returns a zero increment.
    pub fn integrate(&mut self, timestamp_ns: u64, angular_velocity: [f32; 3]) -> DeltaOrientation {
        self.update_bias(angular_velocity);

        let prev = match self.prev_timestamp_ns {
            Some(prev) => prev,
            None => {
                self.prev_timestamp_ns = Some(timestamp_ns);
                return DeltaOrientation::zero();
            }
        };

        if timestamp_ns < prev {
            warn!(
                "Gyroscope timestamp went backwards ({} < {}), dropping increment",
                timestamp_ns, prev
            );
        }
        let elapsed_ns = timestamp_ns.saturating_sub(prev);
        self.prev_timestamp_ns = Some(prev.max(timestamp_ns));

        if elapsed_ns == 0 {
            return DeltaOrientation::zero();
        }
        let dt = (elapsed_ns as f64 * NS_TO_S) as f32;

        let mut delta = [0.0f32; 3];
        for axis in 0..3 {
            let corrected = (angular_velocity[axis] - self.bias[axis]) * dt;
            delta[axis] = self.gate(corrected);
        }

        DeltaOrientation::from(delta)
    }

    /// Forget the previous timestamp; the next sample starts a new interval.
    /// The learned bias is kept.
    pub fn reset(&mut self) {
        self.prev_timestamp_ns = None;
    }

    /// Restart bias learning from scratch.
    pub fn recalibrate(&mut self) {
        self.bias_sum = [0.0; 3];
        self.bias_samples = 0;
        self.bias = [0.0; 3];
        info!(
            "Gyroscope recalibration started ({} samples)",
            self.config.calibration_samples
        );
    }

    /// Bias currently subtracted from every sample (rad/s).
    /// Zero until the calibration window has closed.
    pub fn bias(&self) -> [f32; 3] {
        self.bias
    }

    /// Whether the calibration window has closed.
    pub fn is_calibrated(&self) -> bool {
        self.bias_samples >= self.config.calibration_samples
    }

    /// Number of samples averaged into the bias so far.
    pub fn calibration_progress(&self) -> u32 {
        self.bias_samples
    }

    pub fn config(&self) -> &GyroIntegratorConfig {
        &self.config
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn update_bias(&mut self, angular_velocity: [f32; 3]) {
        if self.is_calibrated() {
            return;
        }

        for (sum, &rate) in self.bias_sum.iter_mut().zip(angular_velocity.iter()) {
            *sum += rate as f64;
        }
        self.bias_samples += 1;

        if self.is_calibrated() {
            let n = self.bias_samples as f64;
            self.bias = [
                (self.bias_sum[0] / n) as f32,
                (self.bias_sum[1] / n) as f32,
                (self.bias_sum[2] / n) as f32,
            ];
            info!(
                "Gyroscope calibration complete: bias = [{:.5}, {:.5}, {:.5}] rad/s",
                self.bias[0], self.bias[1], self.bias[2]
            );
        }
    }

    fn gate(&self, value: f32) -> f32 {
        if value.abs() < self.config.noise_gate {
            0.0
        } else {
            value
        }
    }
}

impl Default for GyroIntegrator {
    fn default() -> Self {
        Self::new(GyroIntegratorConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
