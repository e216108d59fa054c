//! Complete PDR session pipeline.
//!
//! This module orchestrates the two independent sample streams through the
//! fusion components and owns the session lifecycle.
//!
//! # Architecture
//!
//! ```text
//! gyroscope     ──► GyroIntegrator ──► HeadingEstimator ──┐ current heading
//! accelerometer ──► StepDetector ──(step)─────────────────┴─► PositionTracker
//! ```
//!
//! 1. **Heading**: every gyroscope sample is integrated into an increment and
//!    composed onto the orientation; the resulting heading is cached.
//! 2. **Steps**: every accelerometer sample's z axis feeds the step detector.
//! 3. **Path**: each detection reads the cached heading and the configured
//!    stride and appends one point.
//!
//! The only coupling between the streams is the heading read at the instant
//! of a step: it is the heading after the most recent gyroscope sample.
//!
//! # Lifecycle
//! - `start()` begins (or resumes) tracking
//! - `stop()` pauses: state is frozen and samples are ignored
//! - `clear()` resets orientation and path; the step detector and the learned
//!   gyroscope bias carry on
//!
//! # Threading
//! A session processes one sample at a time and never blocks. Hosts that
//! deliver from several threads wrap it in a [`SharedSession`].

use std::sync::Arc;

use log::{debug, info, trace};
use parking_lot::Mutex;

use crate::config::SessionConfig;
use crate::error::PdrResult;
use crate::gyro_integration::GyroIntegrator;
use crate::heading::HeadingEstimator;
use crate::step_detection::StepDetector;
use crate::trajectory::PositionTracker;
use crate::types::*;

/// One tracking session: the four fusion components plus lifecycle state.
#[derive(Debug, Clone)]
pub struct PdrSession {
    config: SessionConfig,
    state: TrackingState,

    // Processing stages
    gyro_integrator: GyroIntegrator,
    heading_estimator: HeadingEstimator,
    step_detector: StepDetector,
    position_tracker: PositionTracker,

    // Latest heading, read by the step path
    current_heading_rad: f32,
}

impl PdrSession {
    /// Creates an idle session after validating the configuration.
    pub fn new(config: SessionConfig) -> PdrResult<Self> {
        config.validate()?;

        Ok(Self {
            gyro_integrator: GyroIntegrator::new(config.gyro),
            heading_estimator: HeadingEstimator::new(config.heading),
            step_detector: StepDetector::new(config.step),
            position_tracker: PositionTracker::new(),

            config,
            state: TrackingState::Idle,
            current_heading_rad: 0.0,
        })
    }

    // =========================================================================
    // CONTROL SIGNALS
    // =========================================================================

    /// Begins or resumes tracking.
    ///
    /// The gyroscope interval restarts so time spent paused is not
    /// integrated as rotation.
    pub fn start(&mut self) {
        if self.state.is_tracking() {
            return;
        }
        self.gyro_integrator.reset();
        self.state = TrackingState::Tracking;
        info!(
            "Tracking started (stride = {}, user = {})",
            self.config.stride_length,
            self.config.user_name.as_deref().unwrap_or("-")
        );
    }

    /// Pauses tracking. Samples delivered while paused are ignored.
    pub fn stop(&mut self) {
        if !self.state.is_tracking() {
            return;
        }
        self.state = TrackingState::Paused;
        info!(
            "Tracking stopped after {} steps",
            self.position_tracker.step_count()
        );
    }

    /// Resets the orientation to identity and the path to the origin.
    ///
    /// Tracking state, step detector and gyroscope bias are left untouched.
    pub fn clear(&mut self) {
        self.heading_estimator.reset();
        self.position_tracker.reset();
        self.current_heading_rad = 0.0;
        info!("Session cleared");
    }

    // =========================================================================
    // SAMPLE INPUT
    // =========================================================================

    /// Routes a tagged sample to its sub-pipeline.
    pub fn process(&mut self, event: &SensorEvent) -> Option<SessionOutput> {
        match event {
            SensorEvent::Gyroscope(sample) => {
                self.on_gyroscope(sample).map(SessionOutput::Heading)
            }
            SensorEvent::Accelerometer(sample) => {
                self.on_accelerometer(sample).map(SessionOutput::Accelerometer)
            }
        }
    }

    /// Processes one gyroscope sample. None when not tracking.
    pub fn on_gyroscope(&mut self, sample: &SensorSample) -> Option<HeadingUpdate> {
        if !self.state.is_tracking() {
            return None;
        }

        let delta = self
            .gyro_integrator
            .integrate(sample.timestamp_ns, sample.values);
        self.current_heading_rad = self.heading_estimator.apply(&delta);

        trace!(
            "t={} heading={:.4} rad",
            sample.timestamp_ns,
            self.current_heading_rad
        );

        Some(HeadingUpdate {
            timestamp_ns: sample.timestamp_ns,
            delta,
            heading_rad: self.current_heading_rad,
        })
    }

    /// Processes one accelerometer sample. None when not tracking.
    pub fn on_accelerometer(&mut self, sample: &SensorSample) -> Option<AccelerometerUpdate> {
        if !self.state.is_tracking() {
            return None;
        }

        let vertical_accel = sample.z();
        let step = if self.step_detector.observe(vertical_accel) {
            Some(self.record_step(sample.timestamp_ns))
        } else {
            None
        };

        Some(AccelerometerUpdate {
            timestamp_ns: sample.timestamp_ns,
            vertical_accel,
            step,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Heading after the most recent gyroscope sample, in (-π, π].
    pub fn heading(&self) -> f32 {
        self.current_heading_rad
    }

    /// The path since the last clear, origin first.
    pub fn path(&self) -> &[PathPoint] {
        self.position_tracker.path()
    }

    pub fn last_point(&self) -> PathPoint {
        self.position_tracker.last_point()
    }

    /// Steps appended to the current path.
    pub fn step_count(&self) -> usize {
        self.position_tracker.step_count()
    }

    /// Steps detected over the whole session, clears included.
    pub fn total_steps_detected(&self) -> u64 {
        self.step_detector.total_steps()
    }

    pub fn total_distance(&self) -> f64 {
        self.position_tracker.total_distance()
    }

    pub fn stride_length(&self) -> f32 {
        self.config.stride_length
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn gyro_integrator(&self) -> &GyroIntegrator {
        &self.gyro_integrator
    }

    pub fn heading_estimator(&self) -> &HeadingEstimator {
        &self.heading_estimator
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn record_step(&mut self, timestamp_ns: u64) -> StepEvent {
        let stride_length = self.config.stride_length;
        let heading_rad = self.current_heading_rad;
        let point = self.position_tracker.on_step(stride_length, heading_rad);

        debug!(
            "Step {} at t={}: heading={:.4} rad -> ({:.3}, {:.3})",
            self.position_tracker.step_count(),
            timestamp_ns,
            heading_rad,
            point.x,
            point.y
        );

        StepEvent::new(timestamp_ns, stride_length, heading_rad, point)
    }
}

/// Cloneable, thread-safe handle to a session.
///
/// All components and the orientation state sit behind one mutex, so a
/// heading update and a step's heading read never interleave.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<PdrSession>>,
}

impl SharedSession {
    pub fn new(session: PdrSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn start(&self) {
        self.inner.lock().start();
    }

    pub fn stop(&self) {
        self.inner.lock().stop();
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn process(&self, event: &SensorEvent) -> Option<SessionOutput> {
        self.inner.lock().process(event)
    }

    pub fn on_gyroscope(&self, sample: &SensorSample) -> Option<HeadingUpdate> {
        self.inner.lock().on_gyroscope(sample)
    }

    pub fn on_accelerometer(&self, sample: &SensorSample) -> Option<AccelerometerUpdate> {
        self.inner.lock().on_accelerometer(sample)
    }

    pub fn heading(&self) -> f32 {
        self.inner.lock().heading()
    }

    pub fn state(&self) -> TrackingState {
        self.inner.lock().state()
    }

    /// Copy of the current path.
    pub fn path(&self) -> Vec<PathPoint> {
        self.inner.lock().path().to_vec()
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut PdrSession) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdrError;

    const MS: u64 = 1_000_000;

    fn accel(t_ms: u64, z: f32) -> SensorSample {
        SensorSample::new(t_ms * MS, [0.0, 0.0, z])
    }

    fn gyro(t_ms: u64, z_rate: f32) -> SensorSample {
        SensorSample::new(t_ms * MS, [0.0, 0.0, z_rate])
    }

    fn started_session() -> PdrSession {
        let mut config = SessionConfig::default();
        config.gyro.calibration_samples = 0;
        let mut session = PdrSession::new(config).unwrap();
        session.start();
        session
    }

    #[test]
    fn test_session_creation() {
        let session = PdrSession::new(SessionConfig::default()).unwrap();
        assert_eq!(session.state(), TrackingState::Idle);
        assert_eq!(session.path(), &[PathPoint::ORIGIN]);
        assert_eq!(session.heading(), 0.0);
        assert_eq!(session.stride_length(), 2.5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SessionConfig::default();
        config.step.upper_threshold = 1.0;
        assert!(matches!(
            PdrSession::new(config),
            Err(PdrError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_idle_session_ignores_samples() {
        let mut session = PdrSession::new(SessionConfig::default()).unwrap();
        assert!(session.on_accelerometer(&accel(0, 12.0)).is_none());
        assert!(session.on_gyroscope(&gyro(0, 1.0)).is_none());
        assert_eq!(session.total_steps_detected(), 0);
    }

    #[test]
    fn test_process_routes_by_kind() {
        let mut session = started_session();

        let out = session.process(&SensorEvent::Gyroscope(gyro(0, 0.0)));
        assert!(matches!(out, Some(SessionOutput::Heading(_))));

        let out = session.process(&SensorEvent::Accelerometer(accel(0, 9.8)));
        assert!(matches!(out, Some(SessionOutput::Accelerometer(_))));
    }

    #[test]
    fn test_step_uses_latest_heading() {
        let mut session = started_session();

        // 90° left turn: π/2 rad over 1 s
        session.on_gyroscope(&gyro(0, 0.0));
        for i in 1..=100 {
            session.on_gyroscope(&gyro(i * 10, std::f32::consts::FRAC_PI_2));
        }
        let heading = session.heading();
        assert!((heading - std::f32::consts::FRAC_PI_2).abs() < 1e-3);

        session.on_accelerometer(&accel(1000, 12.0));
        let update = session.on_accelerometer(&accel(1010, 5.0)).unwrap();
        let step = update.step.expect("falling sample completes the step");

        assert_eq!(step.heading_rad, heading);
        assert_eq!(step.stride_length, 2.5);
        assert!((step.point.x + 2.5).abs() < 1e-2, "x = {}", step.point.x);
        assert!(step.point.y.abs() < 1e-2, "y = {}", step.point.y);
    }

    #[test]
    fn test_stop_freezes_state() {
        let mut session = started_session();
        session.on_accelerometer(&accel(0, 12.0));
        session.stop();

        assert!(session.on_accelerometer(&accel(10, 5.0)).is_none());
        assert!(session.on_gyroscope(&gyro(10, 3.0)).is_none());
        assert_eq!(session.step_count(), 0);
        assert_eq!(session.state(), TrackingState::Paused);

        // Detector stayed armed through the pause
        session.start();
        let update = session.on_accelerometer(&accel(20, 5.0)).unwrap();
        assert!(update.is_step());
    }

    #[test]
    fn test_resume_does_not_integrate_pause_gap() {
        let mut session = started_session();
        session.on_gyroscope(&gyro(0, 0.5));
        session.stop();
        session.start();

        // 10 s later at 0.5 rad/s: first sample after resume only re-anchors time
        let update = session.on_gyroscope(&gyro(10_000, 0.5)).unwrap();
        assert!(update.delta.is_zero());
        assert_eq!(session.heading(), 0.0);
    }

    #[test]
    fn test_clear_resets_heading_and_path_only() {
        let mut session = started_session();
        session.on_gyroscope(&gyro(0, 0.0));
        session.on_gyroscope(&gyro(100, 2.0));
        session.on_accelerometer(&accel(100, 12.0));
        session.on_accelerometer(&accel(110, 5.0));
        session.on_accelerometer(&accel(120, 12.0));
        assert_eq!(session.step_count(), 1);

        session.clear();

        assert_eq!(session.path(), &[PathPoint::ORIGIN]);
        assert_eq!(session.heading(), 0.0);
        assert_eq!(session.heading_estimator().heading(), 0.0);
        assert_eq!(session.state(), TrackingState::Tracking);

        // Armed before the clear, so the next fall completes a step from the origin
        let step = session.on_accelerometer(&accel(130, 5.0)).unwrap().step.unwrap();
        assert!((step.point.x - 0.0).abs() < 1e-9);
        assert!((step.point.y - 2.5).abs() < 1e-9);
        assert_eq!(session.total_steps_detected(), 2);
    }

    #[test]
    fn test_double_start_and_stop_are_idempotent() {
        let mut session = started_session();
        session.start();
        assert_eq!(session.state(), TrackingState::Tracking);
        session.stop();
        session.stop();
        assert_eq!(session.state(), TrackingState::Paused);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let mut config = SessionConfig::default();
        config.gyro.calibration_samples = 0;
        let shared = SharedSession::new(PdrSession::new(config).unwrap());
        shared.start();

        let gyro_handle = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    shared.on_gyroscope(&gyro(i * 5, 0.0));
                }
            })
        };
        let accel_handle = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..10 {
                    shared.on_accelerometer(&accel(i * 100, 12.0));
                    shared.on_accelerometer(&accel(i * 100 + 50, 5.0));
                }
            })
        };
        gyro_handle.join().unwrap();
        accel_handle.join().unwrap();

        assert_eq!(shared.path().len(), 11);
        assert_eq!(shared.heading(), 0.0);
        let last = shared.with(|session| session.last_point());
        assert!((last.y - 25.0).abs() < 1e-6);
    }
}
