//! Trace Pedestrian Dead Reckoning Library
//!
//! An on-device dead-reckoning kernel that turns a phone's raw accelerometer
//! and uncalibrated gyroscope streams into a walked 2D path, one point per
//! detected step.
//!
//! # Design Philosophy
//!
//! - **Relative motion only**: position is the sum of stride vectors; there
//!   is no absolute fix and drift is accepted.
//! - **Two independent streams**: heading is maintained from the gyroscope,
//!   steps from the accelerometer; they meet only when a step reads the
//!   current heading.
//! - **Total fusion core**: integrator, estimator, detector and tracker never
//!   fail. Errors exist only at the edges (config, trace files, recording).
//! - **O(1) per sample**: fixed state per component, the path is the only
//!   growing buffer.
//!
//! # Example
//!
//! ```ignore
//! use trace_pdr::{PdrSession, SessionConfig, SensorSample};
//!
//! let mut session = PdrSession::new(SessionConfig::default())?;
//! session.start();
//!
//! session.on_gyroscope(&SensorSample::new(0, [0.0, 0.0, 0.0]));
//! session.on_accelerometer(&SensorSample::new(0, [0.0, 0.0, 12.0]));
//! if let Some(update) = session.on_accelerometer(&SensorSample::new(20_000_000, [0.0, 0.0, 5.0])) {
//!     println!("step: {:?}", update.step);
//! }
//! ```

pub mod config;
pub mod error;
pub mod gyro_integration;
pub mod heading;
pub mod pipeline;
pub mod recorder;
pub mod replay;
pub mod step_detection;
pub mod trajectory;
pub mod types;


// Re-export commonly used types
pub use config::SessionConfig;
pub use error::{PdrError, PdrResult};
pub use gyro_integration::{GyroIntegrator, GyroIntegratorConfig};
pub use heading::{HeadingConfig, HeadingEstimator};
pub use pipeline::{PdrSession, SharedSession};
pub use recorder::{CsvRecorder, NullRecorder, SessionRecorder};
pub use replay::{read_trace, read_trace_file, replay, ReplaySummary};
pub use step_detection::{StepDetector, StepDetectorConfig};
pub use trajectory::PositionTracker;
pub use types::{
    AccelerometerUpdate, DeltaOrientation, HeadingUpdate, PathPoint, SensorEvent, SensorKind,
    SensorSample, SessionOutput, StepEvent, TrackingState,
};
