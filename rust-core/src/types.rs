//! Core data types for the PDR engine.
//!
//! This module defines the values that flow between the fusion components:
//! raw sensor samples on the way in, and heading updates, step events and
//! path points on the way out.
//!
//! Design principle: Types should make intent obvious. The two sensor streams
//! never share a type at the fusion boundary; an accelerometer sample can not
//! reach the heading estimator by accident.

use serde::Deserialize;

/// A single raw three-axis sensor sample.
///
/// This is the minimal input contract: a monotonic timestamp and three axis
/// values. Which physical sensor produced it is carried by [`SensorEvent`],
/// not by the sample itself.
///
/// Units: m/s² for the accelerometer, rad/s for the gyroscope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Monotonic timestamp in nanoseconds.
    pub timestamp_ns: u64,

    /// Axis readings [x, y, z].
    pub values: [f32; 3],
}

impl SensorSample {
    /// Creates a new sample.
    ///
    /// Assumptions:
    /// - timestamp_ns is non-decreasing within one sensor stream
    /// - the two streams may use unrelated clocks
    pub fn new(timestamp_ns: u64, values: [f32; 3]) -> Self {
        Self {
            timestamp_ns,
            values,
        }
    }

    /// Vertical (z-axis) component, the channel used for step detection.
    pub fn z(&self) -> f32 {
        self.values[2]
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f32 {
        let [x, y, z] = self.values;
        (x * x + y * y + z * z).sqrt()
    }
}

/// Physical origin of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Linear acceleration including gravity.
    Accelerometer,
    /// Uncalibrated angular rate (bias not removed by the platform).
    Gyroscope,
}

/// A sample tagged with the sensor that produced it.
///
/// Routing on the variant happens once, at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    Accelerometer(SensorSample),
    Gyroscope(SensorSample),
}

impl SensorEvent {
    /// Tags a sample with its kind.
    pub fn new(kind: SensorKind, sample: SensorSample) -> Self {
        match kind {
            SensorKind::Accelerometer => SensorEvent::Accelerometer(sample),
            SensorKind::Gyroscope => SensorEvent::Gyroscope(sample),
        }
    }

    pub fn kind(&self) -> SensorKind {
        match self {
            SensorEvent::Accelerometer(_) => SensorKind::Accelerometer,
            SensorEvent::Gyroscope(_) => SensorKind::Gyroscope,
        }
    }

    pub fn sample(&self) -> &SensorSample {
        match self {
            SensorEvent::Accelerometer(s) | SensorEvent::Gyroscope(s) => s,
        }
    }
}

// ============================================================================
// ORIENTATION TYPES
// ============================================================================

/// Incremental rotation (radians per axis) between two gyroscope samples.
///
/// Interpreted as a rotation vector: direction is the axis, norm the angle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaOrientation {
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
}

impl DeltaOrientation {
    pub fn new(dx: f32, dy: f32, dz: f32) -> Self {
        Self { dx, dy, dz }
    }

    /// The zero increment (no rotation).
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dz == 0.0
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy + self.dz * self.dz).sqrt()
    }

    /// The increment that exactly undoes this one.
    pub fn inverse(&self) -> Self {
        Self::new(-self.dx, -self.dy, -self.dz)
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.dx, self.dy, self.dz]
    }
}

impl From<[f32; 3]> for DeltaOrientation {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Heading output produced for every gyroscope sample while tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingUpdate {
    /// Timestamp of the gyroscope sample.
    pub timestamp_ns: u64,
    /// Increment that was applied.
    pub delta: DeltaOrientation,
    /// Heading after the increment, in (-π, π].
    pub heading_rad: f32,
}

// ============================================================================
// PATH TYPES
// ============================================================================

/// A planar position in the session frame (origin = session start).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

impl PathPoint {
    pub const ORIGIN: PathPoint = PathPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from origin.
    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// 2D distance to another point.
    pub fn distance_to(&self, other: &PathPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A detected step together with the values used to place it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Timestamp of the accelerometer sample that completed the step.
    pub timestamp_ns: u64,
    /// Stride length applied to this step.
    pub stride_length: f32,
    /// Heading read at the instant of the step, in (-π, π].
    pub heading_rad: f32,
    /// The newly appended path point.
    pub point: PathPoint,
}

impl StepEvent {
    pub fn new(timestamp_ns: u64, stride_length: f32, heading_rad: f32, point: PathPoint) -> Self {
        Self {
            timestamp_ns,
            stride_length,
            heading_rad,
            point,
        }
    }
}

/// Outcome of one accelerometer sample while tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerometerUpdate {
    pub timestamp_ns: u64,
    /// Value fed to the step detector (z axis).
    pub vertical_accel: f32,
    /// Present exactly when this sample completed a step.
    pub step: Option<StepEvent>,
}

impl AccelerometerUpdate {
    pub fn is_step(&self) -> bool {
        self.step.is_some()
    }
}

/// Per-sample output of the session, mirroring the input routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutput {
    Heading(HeadingUpdate),
    Accelerometer(AccelerometerUpdate),
}

/// Tracking lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// Created, never started.
    #[default]
    Idle,
    /// Samples are being processed.
    Tracking,
    /// Stopped by the host; state is frozen and samples are ignored.
    Paused,
}

impl TrackingState {
    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}
