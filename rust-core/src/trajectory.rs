//! Pedestrian Dead Reckoning (PDR) Path Module.
//!
//! Accumulates the walked path one stride at a time: every detected step
//! moves the last point by the stride length in the current heading
//! direction.
//!
//! The heading source measures its azimuth from a reference axis a quarter
//! turn away from the plotting frame's x axis, so every displacement is
//! computed at `heading + π/2`. A zero heading walks along +y.

use std::f64::consts::FRAC_PI_2;

use crate::types::PathPoint;

/// Append-only path anchored at the origin.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    path: Vec<PathPoint>,
    total_distance: f64,
}

impl PositionTracker {
    /// Create a tracker whose path holds only the origin.
    pub fn new() -> Self {
        Self {
            path: vec![PathPoint::ORIGIN],
            total_distance: 0.0,
        }
    }

    /// Advance the path by one stride and return the new point.
    ///
    /// Stride length and heading are taken as given.
    pub fn on_step(&mut self, stride_length: f32, heading_rad: f32) -> PathPoint {
        let (dx, dy) = stride_displacement(stride_length, heading_rad);
        let last = self.last_point();
        let point = PathPoint::new(last.x + dx, last.y + dy);

        self.path.push(point);
        self.total_distance += stride_length as f64;
        point
    }

    /// Get the full path, origin first.
    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    /// The most recent point (the origin on a fresh path).
    pub fn last_point(&self) -> PathPoint {
        self.path.last().copied().unwrap_or(PathPoint::ORIGIN)
    }

    /// Number of strides appended since the last reset.
    pub fn step_count(&self) -> usize {
        self.path.len() - 1
    }

    /// Sum of stride lengths since the last reset.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Collapse the path to the origin.
    pub fn reset(&mut self) {
        self.path.clear();
        self.path.push(PathPoint::ORIGIN);
        self.total_distance = 0.0;
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Planar displacement of one stride at the given heading.
pub fn stride_displacement(stride_length: f32, heading_rad: f32) -> (f64, f64) {
    let length = stride_length as f64;
    let direction = heading_rad as f64 + FRAC_PI_2;
    (length * direction.cos(), length * direction.sin())
}

// ============================================================================
// TESTS
// ============================================================================
