//! Trace replay.
//!
//! A trace is a comma-separated file interleaving both sensor streams in
//! delivery order:
//!
//! ```text
//! sensor,timestamp_ns,x,y,z
//! gyroscope,1000000,0.001,-0.002,0.0005
//! accelerometer,1200000,0.12,0.31,9.74
//! ```
//!
//! Replaying feeds every row through a session exactly as a live host
//! would and forwards each output to a [`SessionRecorder`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, info};
use serde::Deserialize;

use crate::error::PdrResult;
use crate::pipeline::PdrSession;
use crate::recorder::SessionRecorder;
use crate::types::*;

/// One row of a trace file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TraceRecord {
    pub sensor: SensorKind,
    pub timestamp_ns: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<TraceRecord> for SensorEvent {
    fn from(record: TraceRecord) -> Self {
        SensorEvent::new(
            record.sensor,
            SensorSample::new(record.timestamp_ns, [record.x, record.y, record.z]),
        )
    }
}

/// What a replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub accelerometer_samples: usize,
    pub gyroscope_samples: usize,
    pub steps: usize,
    pub final_point: PathPoint,
    pub final_heading_rad: f32,
    pub total_distance: f64,
}

/// Parse a trace from any reader.
pub fn read_trace<R: Read>(reader: R) -> PdrResult<Vec<SensorEvent>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut events = Vec::new();
    for record in reader.deserialize::<TraceRecord>() {
        events.push(SensorEvent::from(record?));
    }

    debug!("Parsed {} trace rows", events.len());
    Ok(events)
}

/// Parse a trace file.
pub fn read_trace_file(path: impl AsRef<Path>) -> PdrResult<Vec<SensorEvent>> {
    let path = path.as_ref();
    let events = read_trace(File::open(path)?)?;
    info!("Loaded {} samples from {}", events.len(), path.display());
    Ok(events)
}

/// Drive `session` with `events`, recording every output.
///
/// An idle or paused session is started first. The recorder is flushed
/// before returning.
pub fn replay<'a, I, R>(session: &mut PdrSession, events: I, recorder: &mut R) -> PdrResult<ReplaySummary>
where
    I: IntoIterator<Item = &'a SensorEvent>,
    R: SessionRecorder + ?Sized,
{
    session.start();

    let mut accelerometer_samples = 0;
    let mut gyroscope_samples = 0;

    for event in events {
        match event.kind() {
            SensorKind::Accelerometer => accelerometer_samples += 1,
            SensorKind::Gyroscope => gyroscope_samples += 1,
        }
        if let Some(output) = session.process(event) {
            recorder.record(event, &output)?;
        }
    }
    recorder.flush()?;

    let summary = ReplaySummary {
        accelerometer_samples,
        gyroscope_samples,
        steps: session.step_count(),
        final_point: session.last_point(),
        final_heading_rad: session.heading(),
        total_distance: session.total_distance(),
    };

    info!(
        "Replay finished: {} steps, {:.2} m, final point ({:.3}, {:.3})",
        summary.steps, summary.total_distance, summary.final_point.x, summary.final_point.y
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::error::PdrError;
    use crate::recorder::{CsvRecorder, NullRecorder};

    const TRACE: &str = "\
sensor,timestamp_ns,x,y,z
gyroscope,0,0.0,0.0,0.0
accelerometer,0,0.1,0.2,5.0
accelerometer,5000000,0.1,0.2,12.0
gyroscope,5000000,0.0,0.0,0.0
accelerometer,10000000,0.1,0.2,9.0
accelerometer,15000000,0.1,0.2,6.0
accelerometer,20000000,0.1,0.2,4.0
";

    fn session() -> PdrSession {
        let mut config = SessionConfig::default();
        config.gyro.calibration_samples = 0;
        PdrSession::new(config).unwrap()
    }

    #[test]
    fn test_read_trace() {
        let events = read_trace(TRACE.as_bytes()).unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0].kind(), SensorKind::Gyroscope);
        assert_eq!(
            events[2],
            SensorEvent::Accelerometer(SensorSample::new(5_000_000, [0.1, 0.2, 12.0]))
        );
    }

    #[test]
    fn test_read_trace_tolerates_whitespace() {
        let trace = "sensor, timestamp_ns, x, y, z\naccelerometer, 1, 0.0, 0.0, 9.8\n";
        let events = read_trace(trace.as_bytes()).unwrap();
        assert_eq!(events[0].sample().z(), 9.8);
    }

    #[test]
    fn test_unknown_sensor_is_error() {
        let trace = "sensor,timestamp_ns,x,y,z\nmagnetometer,1,0,0,0\n";
        assert!(matches!(read_trace(trace.as_bytes()), Err(PdrError::Csv(_))));
    }

    #[test]
    fn test_missing_trace_file_is_io_error() {
        let result = read_trace_file("/definitely/not/a/trace.csv");
        assert!(matches!(result, Err(PdrError::Io(_))));
    }

    #[test]
    fn test_replay_summary() {
        let events = read_trace(TRACE.as_bytes()).unwrap();
        let mut session = session();

        let summary = replay(&mut session, &events, &mut NullRecorder).unwrap();

        assert_eq!(summary.accelerometer_samples, 5);
        assert_eq!(summary.gyroscope_samples, 2);
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.final_heading_rad, 0.0);
        assert!((summary.final_point.x - 0.0).abs() < 1e-6);
        assert!((summary.final_point.y - 2.5).abs() < 1e-6);
        assert!((summary.total_distance - 2.5).abs() < 1e-9);
        assert_eq!(session.state(), TrackingState::Tracking);
    }

    #[test]
    fn test_replay_records_every_output() {
        let events = read_trace(TRACE.as_bytes()).unwrap();
        let mut session = session();
        let mut recorder = CsvRecorder::from_writers(Vec::new(), Vec::new(), Vec::new()).unwrap();

        replay(&mut session, &events, &mut recorder).unwrap();

        let (accel, gyro, path) = recorder.into_writers().unwrap();
        let count = |bytes: Vec<u8>| String::from_utf8(bytes).unwrap().lines().count();
        assert_eq!(count(accel), 1 + 5);
        assert_eq!(count(gyro), 1 + 2);
        assert_eq!(count(path), 1 + 1);
    }
}
