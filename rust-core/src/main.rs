//! Trace PDR replay tool
//!
//! Replays a recorded sensor trace through a tracking session, writes the
//! three session CSV streams and prints the walked path.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use log::error;

use trace_pdr::heading::rad_to_deg;
use trace_pdr::{read_trace_file, replay, CsvRecorder, PdrResult, PdrSession, SessionConfig};

#[derive(FromArgs)]
/// Replay a sensor trace through the dead-reckoning engine.
struct Args {
    /// trace CSV with header `sensor,timestamp_ns,x,y,z`
    #[argh(positional)]
    trace: PathBuf,

    /// session config (TOML); defaults are used when omitted
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory for the recorded session streams
    #[argh(option, short = 'o', default = "PathBuf::from(\"pdr_output\")")]
    out_dir: PathBuf,

    /// stride length override, in path units
    #[argh(option, short = 's')]
    stride: Option<f32>,
}

fn run(args: Args) -> PdrResult<()> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(stride) = args.stride {
        config = config.with_stride_length(stride);
    }

    let mut session = PdrSession::new(config)?;
    let events = read_trace_file(&args.trace)?;
    let mut recorder = CsvRecorder::create(&args.out_dir)?;

    let summary = replay(&mut session, &events, &mut recorder)?;

    println!("Trace PDR v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Samples: {} accelerometer, {} gyroscope",
        summary.accelerometer_samples, summary.gyroscope_samples
    );
    println!("Steps: {} ({:.2} total)", summary.steps, summary.total_distance);
    println!(
        "Final heading: {:.1}°",
        rad_to_deg(summary.final_heading_rad)
    );
    println!(
        "Final point: ({:.3}, {:.3})",
        summary.final_point.x, summary.final_point.y
    );
    for (i, point) in session.path().iter().enumerate() {
        println!("{:>5} {:>10.3} {:>10.3}", i, point.x, point.y);
    }
    println!("Streams written to {}", args.out_dir.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
