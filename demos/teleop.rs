// Keyboard teleop: W/S drive, A/D turn, R/F speed, Space halt, Q quit
//
// Motor A is the left side, motor B the right side.
//
// Usage: cargo run --example teleop -- [address]
use circuit_cubes::{BtleTransport, Cube, CubeConfig, Motor};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

const SPEEDS: [i32; 3] = [30, 60, 100];
const INPUT_TIMEOUT_MS: u64 = 150; // Stop the motors after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = CubeConfig {
        address: std::env::args().nth(1),
        verbose: false,
        ..CubeConfig::default()
    };

    let transport = BtleTransport::new(config.scan_timeout()).await?;
    let mut cube = Cube::new(transport, config);
    cube.connect(None).await?;
    info!("Connected to {}", cube.address().unwrap_or("?"));

    info!("Controls: W/S=drive, A/D=turn, R/F=speed, Space=halt, Q=quit");
    print_speed(0);

    enable_raw_mode()?;
    let result = run_teleop(&mut cube).await;
    disable_raw_mode()?;

    cube.halt().await?;
    cube.disconnect().await?;
    result
}

async fn run_teleop(cube: &mut Cube<BtleTransport>) -> Result<(), Box<dyn std::error::Error>> {
    let mut speed_idx: usize = 0;

    // (left, right) velocity requested by the keys, and the last one sent
    let mut drive = (0, 0);
    let mut sent = (0, 0);
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                let v = SPEEDS[speed_idx];

                match code {
                    KeyCode::Char('w') if pressed => {
                        drive = (v, v);
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        drive = (-v, -v);
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        drive = (-v, v);
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        drive = (v, -v);
                        last_movement_input = Instant::now();
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(SPEEDS.len() - 1);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    KeyCode::Char(' ') if pressed => {
                        drive = (0, 0);
                        cube.halt().await?;
                        sent = (0, 0);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            drive = (0, 0);
        }

        // Only write when the requested velocities change
        if drive != sent {
            cube.run_motors(&[(Motor::A, drive.0), (Motor::B, drive.1)], Duration::ZERO, true)
                .await?;
            sent = drive;
        }
    }

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {} ({})", label, SPEEDS[idx]);
}
