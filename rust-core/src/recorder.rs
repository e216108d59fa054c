//! Session recording.
//!
//! The engine does not own a storage format; hosts plug a [`SessionRecorder`]
//! in to persist what a session produces. [`CsvRecorder`] writes the three
//! streams a tracking session has always been logged as, one file each,
//! separated by `;`:
//!
//! | stream                  | columns                                  |
//! |-------------------------|------------------------------------------|
//! | `Accelerometer`         | `dt;Ax;Ay;Az;findStep`                   |
//! | `GyroscopeUncalibrated` | `dt;Gx;Gy;Gz;heading`                    |
//! | `XYDataSet`             | `dt;strideLength;heading;pointX;pointY`  |

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use csv::WriterBuilder;
use log::info;

use crate::error::{PdrError, PdrResult};
use crate::types::*;

pub const ACCELEROMETER_STREAM: &str = "Accelerometer";
pub const GYROSCOPE_STREAM: &str = "GyroscopeUncalibrated";
pub const PATH_STREAM: &str = "XYDataSet";

const ACCELEROMETER_HEADER: [&str; 5] = ["dt", "Ax", "Ay", "Az", "findStep"];
const GYROSCOPE_HEADER: [&str; 5] = ["dt", "Gx", "Gy", "Gz", "heading"];
const PATH_HEADER: [&str; 5] = ["dt", "strideLength", "heading", "pointX", "pointY"];

/// Sink for everything a session emits.
pub trait SessionRecorder {
    /// One accelerometer sample and whether it completed a step.
    fn record_accelerometer(
        &mut self,
        sample: &SensorSample,
        update: &AccelerometerUpdate,
    ) -> PdrResult<()>;

    /// One gyroscope sample and the heading it produced.
    fn record_gyroscope(&mut self, sample: &SensorSample, update: &HeadingUpdate) -> PdrResult<()>;

    /// One appended path point.
    fn record_step(&mut self, step: &StepEvent) -> PdrResult<()>;

    fn flush(&mut self) -> PdrResult<()> {
        Ok(())
    }

    /// Records a session output against the event that produced it.
    fn record(&mut self, event: &SensorEvent, output: &SessionOutput) -> PdrResult<()> {
        match (event, output) {
            (SensorEvent::Gyroscope(sample), SessionOutput::Heading(update)) => {
                self.record_gyroscope(sample, update)
            }
            (SensorEvent::Accelerometer(sample), SessionOutput::Accelerometer(update)) => {
                self.record_accelerometer(sample, update)?;
                if let Some(step) = &update.step {
                    self.record_step(step)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl SessionRecorder for NullRecorder {
    fn record_accelerometer(&mut self, _: &SensorSample, _: &AccelerometerUpdate) -> PdrResult<()> {
        Ok(())
    }

    fn record_gyroscope(&mut self, _: &SensorSample, _: &HeadingUpdate) -> PdrResult<()> {
        Ok(())
    }

    fn record_step(&mut self, _: &StepEvent) -> PdrResult<()> {
        Ok(())
    }
}

/// Semicolon-separated recorder over three writers.
pub struct CsvRecorder<W: Write> {
    accelerometer: csv::Writer<W>,
    gyroscope: csv::Writer<W>,
    path: csv::Writer<W>,
}

impl CsvRecorder<File> {
    /// Creates `dir` if needed and opens one `<stream>.csv` file per stream.
    pub fn create(dir: impl AsRef<Path>) -> PdrResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let open = |stream: &str| File::create(dir.join(format!("{}.csv", stream)));
        let recorder = Self::from_writers(
            open(ACCELEROMETER_STREAM)?,
            open(GYROSCOPE_STREAM)?,
            open(PATH_STREAM)?,
        )?;

        info!("Recording session to {}", dir.display());
        Ok(recorder)
    }
}

impl<W: Write> CsvRecorder<W> {
    /// Wraps three writers and writes each stream's header row.
    pub fn from_writers(accelerometer: W, gyroscope: W, path: W) -> PdrResult<Self> {
        let mut recorder = Self {
            accelerometer: semicolon_writer(accelerometer),
            gyroscope: semicolon_writer(gyroscope),
            path: semicolon_writer(path),
        };

        recorder.accelerometer.write_record(ACCELEROMETER_HEADER)?;
        recorder.gyroscope.write_record(GYROSCOPE_HEADER)?;
        recorder.path.write_record(PATH_HEADER)?;
        Ok(recorder)
    }

    /// Flushes and returns the underlying writers
    /// (accelerometer, gyroscope, path).
    pub fn into_writers(self) -> PdrResult<(W, W, W)> {
        Ok((
            unwrap_writer(self.accelerometer)?,
            unwrap_writer(self.gyroscope)?,
            unwrap_writer(self.path)?,
        ))
    }
}

impl<W: Write> SessionRecorder for CsvRecorder<W> {
    fn record_accelerometer(
        &mut self,
        sample: &SensorSample,
        update: &AccelerometerUpdate,
    ) -> PdrResult<()> {
        let [x, y, z] = sample.values;
        let find_step = if update.is_step() { "1" } else { "0" };
        self.accelerometer.write_record([
            sample.timestamp_ns.to_string(),
            x.to_string(),
            y.to_string(),
            z.to_string(),
            find_step.to_string(),
        ])?;
        Ok(())
    }

    fn record_gyroscope(&mut self, sample: &SensorSample, update: &HeadingUpdate) -> PdrResult<()> {
        let [x, y, z] = sample.values;
        self.gyroscope.write_record([
            sample.timestamp_ns.to_string(),
            x.to_string(),
            y.to_string(),
            z.to_string(),
            update.heading_rad.to_string(),
        ])?;
        Ok(())
    }

    fn record_step(&mut self, step: &StepEvent) -> PdrResult<()> {
        self.path.write_record([
            step.timestamp_ns.to_string(),
            step.stride_length.to_string(),
            step.heading_rad.to_string(),
            step.point.x.to_string(),
            step.point.y.to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> PdrResult<()> {
        self.accelerometer.flush()?;
        self.gyroscope.flush()?;
        self.path.flush()?;
        Ok(())
    }
}

fn semicolon_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer)
}

fn unwrap_writer<W: Write>(writer: csv::Writer<W>) -> PdrResult<W> {
    writer
        .into_inner()
        .map_err(|e| PdrError::Io(io::Error::new(e.error().kind(), e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> CsvRecorder<Vec<u8>> {
        CsvRecorder::from_writers(Vec::new(), Vec::new(), Vec::new()).unwrap()
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_headers_written_on_creation() {
        let (accel, gyro, path) = recorder().into_writers().unwrap();
        assert_eq!(lines(accel), vec!["dt;Ax;Ay;Az;findStep"]);
        assert_eq!(lines(gyro), vec!["dt;Gx;Gy;Gz;heading"]);
        assert_eq!(lines(path), vec!["dt;strideLength;heading;pointX;pointY"]);
    }

    #[test]
    fn test_accelerometer_step_flag() {
        let mut rec = recorder();
        let sample = SensorSample::new(100, [0.5, -0.25, 12.0]);
        let quiet = AccelerometerUpdate {
            timestamp_ns: 100,
            vertical_accel: 12.0,
            step: None,
        };
        let step = StepEvent::new(200, 2.5, 0.0, PathPoint::new(0.0, 2.5));
        let stepping = AccelerometerUpdate {
            step: Some(step),
            ..quiet
        };

        rec.record_accelerometer(&sample, &quiet).unwrap();
        rec.record_accelerometer(&sample, &stepping).unwrap();

        let (accel, _, _) = rec.into_writers().unwrap();
        let rows = lines(accel);
        assert_eq!(rows[1], "100;0.5;-0.25;12;0");
        assert!(rows[2].ends_with(";1"));
    }

    #[test]
    fn test_record_routes_step_to_path_stream() {
        let mut rec = recorder();
        let sample = SensorSample::new(300, [0.0, 0.0, 5.0]);
        let step = StepEvent::new(300, 2.5, 0.5, PathPoint::new(-1.25, 2.0));
        let update = AccelerometerUpdate {
            timestamp_ns: 300,
            vertical_accel: 5.0,
            step: Some(step),
        };

        rec.record(
            &SensorEvent::Accelerometer(sample),
            &SessionOutput::Accelerometer(update),
        )
        .unwrap();

        let (accel, gyro, path) = rec.into_writers().unwrap();
        assert_eq!(lines(accel).len(), 2);
        assert_eq!(lines(gyro).len(), 1);
        assert_eq!(lines(path)[1], "300;2.5;0.5;-1.25;2");
    }

    #[test]
    fn test_gyroscope_row() {
        let mut rec = recorder();
        let sample = SensorSample::new(42, [0.125, 0.0, -1.5]);
        let update = HeadingUpdate {
            timestamp_ns: 42,
            delta: DeltaOrientation::zero(),
            heading_rad: 0.75,
        };

        rec.record(&SensorEvent::Gyroscope(sample), &SessionOutput::Heading(update))
            .unwrap();

        let (_, gyro, _) = rec.into_writers().unwrap();
        assert_eq!(lines(gyro)[1], "42;0.125;0;-1.5;0.75");
    }

    #[test]
    fn test_create_writes_three_files() {
        let dir = std::env::temp_dir().join(format!("trace-pdr-recorder-{}", std::process::id()));
        let mut rec = CsvRecorder::create(&dir).unwrap();
        rec.flush().unwrap();
        drop(rec);

        for stream in [ACCELEROMETER_STREAM, GYROSCOPE_STREAM, PATH_STREAM] {
            assert!(dir.join(format!("{}.csv", stream)).exists(), "{} missing", stream);
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
