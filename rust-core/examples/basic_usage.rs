/// Basic usage example: feed both sensor streams, get a walked path
use trace_pdr::{PdrSession, SensorSample, SessionConfig};

const MS: u64 = 1_000_000;

fn main() {
    println!("=== Trace PDR: Basic Example ===\n");

    // Default config: thresholds 11.5 / 6.5 m/s², stride 2.5
    let mut config = SessionConfig::default();
    config.gyro.calibration_samples = 0;
    let mut session = match PdrSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("invalid config: {}", e);
            return;
        }
    };
    session.start();

    // Simulated stream: two steps north, a left quarter turn, two steps west
    let script: Vec<(u64, char, [f32; 3])> = vec![
        (0, 'g', [0.0, 0.0, 0.0]),
        (20, 'a', [0.1, 0.2, 12.1]),
        (40, 'a', [0.1, 0.2, 5.9]),
        (60, 'a', [0.1, 0.2, 12.3]),
        (80, 'a', [0.1, 0.2, 6.1]),
        // 1.5708 rad/s for one second
        (1000, 'g', [0.0, 0.0, 1.5708]),
        (1100, 'a', [0.1, 0.2, 12.0]),
        (1120, 'a', [0.1, 0.2, 5.0]),
        (1140, 'a', [0.1, 0.2, 11.9]),
        (1160, 'a', [0.1, 0.2, 4.8]),
    ];

    for (t_ms, sensor, values) in script {
        let sample = SensorSample::new(t_ms * MS, values);
        match sensor {
            'g' => {
                if let Some(update) = session.on_gyroscope(&sample) {
                    println!("t={:>5}ms heading {:.3} rad", t_ms, update.heading_rad);
                }
            }
            _ => {
                if let Some(step) = session.on_accelerometer(&sample).and_then(|u| u.step) {
                    println!(
                        "t={:>5}ms step -> ({:.2}, {:.2})",
                        t_ms, step.point.x, step.point.y
                    );
                }
            }
        }
    }

    println!("\n=== Summary ===");
    println!("Steps: {}", session.step_count());
    println!("Distance: {:.2}", session.total_distance());
    for point in session.path() {
        println!("  ({:>6.2}, {:>6.2})", point.x, point.y);
    }
}
