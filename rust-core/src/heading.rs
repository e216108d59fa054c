//! Heading Estimation Module.
//!
//! Maintains the device orientation as a 3×3 rotation matrix, updated by
//! composing each gyroscope increment onto it, and exposes the azimuth of
//! that rotation as the heading.
//!
//! Composition convention: increments are body-frame rotations applied on
//! the right,
//!
//! ```text
//! R_new = R_current · exp([δ]×)
//! ```
//!
//! where `exp([δ]×)` is the exact axis-angle rotation of the increment δ
//! (Rodrigues). Heading is `atan2(R[1][0], R[0][0])`, in (-π, π].
//!
//! No drift correction is attempted beyond periodically re-orthonormalizing
//! the matrix so it stays a valid rotation over long sessions.

use nalgebra::{Rotation3, Vector3};
use serde::Deserialize;

use crate::types::DeltaOrientation;

/// Configuration for heading estimation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Number of applied increments between re-orthonormalizations.
    pub renormalize_interval: u32,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            renormalize_interval: 256,
        }
    }
}

/// Heading estimator over an owned rotation state.
#[derive(Debug, Clone)]
pub struct HeadingEstimator {
    config: HeadingConfig,
    orientation: Rotation3<f32>,
    applied_count: u64,
}

impl HeadingEstimator {
    /// Create a new estimator at the identity orientation.
    pub fn new(config: HeadingConfig) -> Self {
        Self {
            config,
            orientation: Rotation3::identity(),
            applied_count: 0,
        }
    }

    /// Compose one increment onto the orientation and return the new heading.
    pub fn apply(&mut self, delta: &DeltaOrientation) -> f32 {
        if !delta.is_zero() {
            let increment = Rotation3::new(Vector3::new(delta.dx, delta.dy, delta.dz));
            self.orientation = self.orientation * increment;
            self.applied_count += 1;

            if self.applied_count % self.config.renormalize_interval.max(1) as u64 == 0 {
                self.orientation.renormalize();
            }
        }

        self.heading()
    }

    /// Get the current heading in radians, in (-π, π].
    pub fn heading(&self) -> f32 {
        let m = self.orientation.matrix();
        normalize_angle(m[(1, 0)].atan2(m[(0, 0)]))
    }

    /// Current orientation state.
    pub fn orientation(&self) -> &Rotation3<f32> {
        &self.orientation
    }

    /// Number of non-zero increments applied since construction or reset.
    pub fn applied_count(&self) -> u64 {
        self.applied_count
    }

    /// Restore the identity orientation.
    pub fn reset(&mut self) {
        self.orientation = Rotation3::identity();
        self.applied_count = 0;
    }
}

impl Default for HeadingEstimator {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

/// Normalize angle to the (-π, π] range.
pub fn normalize_angle(angle: f32) -> f32 {
    let pi = std::f32::consts::PI;
    let two_pi = 2.0 * pi;
    let mut a = angle % two_pi;
    if a > pi {
        a -= two_pi;
    } else if a <= -pi {
        a += two_pi;
    }
    a
}

/// Convert radians to degrees.
pub fn rad_to_deg(rad: f32) -> f32 {
    rad.to_degrees()
}

/// Convert degrees to radians.
pub fn deg_to_rad(deg: f32) -> f32 {
    deg.to_radians()
}

// ============================================================================
// TESTS
// ============================================================================
